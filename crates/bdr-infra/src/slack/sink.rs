//! Failure sink that reports `failed` dispatch outcomes to the Slack alert
//! channel.

use std::sync::Arc;

use bdr_core::dispatch::FailureSink;
use bdr_types::error::NotifyError;
use bdr_types::outcome::DispatchOutcome;

use super::client::SlackClient;

pub struct SlackFailureSink {
    slack: Arc<SlackClient>,
}

impl SlackFailureSink {
    pub fn new(slack: Arc<SlackClient>) -> Self {
        Self { slack }
    }
}

impl FailureSink for SlackFailureSink {
    fn name(&self) -> &str {
        "slack"
    }

    async fn report(&self, outcome: &DispatchOutcome) -> Result<(), NotifyError> {
        self.slack
            .post_error("BDR workflow failed", &failure_context(outcome))
            .await
            .map_err(NotifyError::from)
    }
}

fn failure_context(outcome: &DispatchOutcome) -> Vec<(&'static str, String)> {
    vec![
        ("workflow", outcome.workflow_label().to_string()),
        ("object_id", outcome.object_id.clone()),
        ("delivery_id", outcome.delivery_id.to_string()),
        (
            "error",
            outcome
                .error_detail
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slack::client::format_error;
    use bdr_types::workflow::WorkflowId;
    use uuid::Uuid;
    use crate::testing;
    use serde_json::json;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

    #[test]
    fn report_text_names_workflow_object_and_error() {
        let outcome = DispatchOutcome::failed(
            Uuid::nil(),
            "42",
            WorkflowId::prep(),
            "hubspot request failed: rate limited",
        );

        let text = format_error("BDR workflow failed", &failure_context(&outcome));
        assert!(text.contains("workflow: `prep`"));
        assert!(text.contains("object_id: `42`"));
        assert!(text.contains("error: `hubspot request failed: rate limited`"));
        assert!(text.contains(&outcome.delivery_id.to_string()));
    }

    #[tokio::test]
    async fn slack_rejection_surfaces_as_notify_rejection() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/chat.postMessage"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "ok": false, "error": "channel_not_found" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let sink = SlackFailureSink::new(Arc::new(testing::slack_client(&server)));
        let outcome = DispatchOutcome::failed(Uuid::nil(), "42", WorkflowId::enrich(), "boom");

        let err = sink.report(&outcome).await.unwrap_err();
        assert!(matches!(err, NotifyError::Rejected(ref r) if r == "channel_not_found"));
    }
}
