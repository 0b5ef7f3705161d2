//! Prep: brief the team when a deal moves to a new stage.

use std::sync::Arc;

use bdr_core::workflow::WorkflowHandler;
use bdr_types::error::WorkflowError;
use bdr_types::event::{NormalizedEvent, ObjectType};

use super::context::{WorkflowContext, require_object};
use crate::hubspot::CrmRecord;

const SYSTEM_PROMPT: &str = "You are a sales operations assistant. You prepare concise deal \
briefings for account executives: bullet points, no filler.";

const DEAL_FIELDS: &[&str] = &["dealname", "amount", "closedate", "pipeline", "hs_next_step"];

pub struct PrepWorkflow {
    context: Arc<WorkflowContext>,
}

impl PrepWorkflow {
    pub fn new(context: Arc<WorkflowContext>) -> Self {
        Self { context }
    }
}

impl WorkflowHandler for PrepWorkflow {
    fn name(&self) -> &str {
        "prep"
    }

    async fn run(&self, event: NormalizedEvent) -> Result<(), WorkflowError> {
        require_object(&event, ObjectType::Deal)?;
        let deal = self.context.fetch_deal(event.object_id()).await?;
        let stage = new_stage(&event, &deal);

        let briefing = self
            .context
            .claude
            .ask(&prep_prompt(&deal, &stage), Some(SYSTEM_PROMPT))
            .await?;

        let text = self.context.with_record_link(
            format!(
                ":briefcase: *{}* moved to `{stage}`\n\n{}",
                deal.display_name(),
                briefing.trim()
            ),
            "deals",
            &deal.id,
        );
        self.context.notify(&text).await?;

        tracing::info!(deal_id = %deal.id, stage = %stage, "deal briefing posted");
        Ok(())
    }
}

/// The stage from the event, falling back to the record for other triggers.
fn new_stage(event: &NormalizedEvent, deal: &CrmRecord) -> String {
    event
        .property_value()
        .filter(|v| !v.is_empty())
        .or_else(|| deal.property("dealstage"))
        .unwrap_or("unknown")
        .to_string()
}

pub fn prep_prompt(deal: &CrmRecord, stage: &str) -> String {
    format!(
        "This deal just moved to the stage `{stage}`.\n\n{}\n\n\
         Prepare a briefing for the next conversation: what this stage usually requires, \
         the likely open questions, and three concrete talking points.",
        deal.describe(DEAL_FIELDS)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use serde_json::json;
    use wiremock::MockServer;
    use chrono::Utc;

    fn deal() -> CrmRecord {
        serde_json::from_str(
            r#"{"id":"900","properties":{"dealname":"Acme expansion","amount":"50000","dealstage":"appointmentscheduled"}}"#,
        )
        .unwrap()
    }

    #[test]
    fn stage_comes_from_event_first() {
        let event = NormalizedEvent::property_change(
            ObjectType::Deal,
            "900",
            "dealstage",
            "contractsent",
            Utc::now(),
        )
        .unwrap();
        assert_eq!(new_stage(&event, &deal()), "contractsent");

        let created = NormalizedEvent::creation(ObjectType::Deal, "900", Utc::now()).unwrap();
        assert_eq!(new_stage(&created, &deal()), "appointmentscheduled");
    }

    #[test]
    fn prompt_includes_deal_fields() {
        let prompt = prep_prompt(&deal(), "contractsent");
        assert!(prompt.contains("`contractsent`"));
        assert!(prompt.contains("dealname: Acme expansion"));
        assert!(prompt.contains("amount: 50000"));
    }

    #[tokio::test]
    async fn briefing_names_deal_and_new_stage() {
        let server = MockServer::start().await;
        testing::mount_record(
            &server,
            "deals",
            "900",
            json!({ "dealname": "Acme expansion", "amount": "50000", "dealstage": "contractsent" }),
        )
        .await;
        testing::mount_claude(&server, "- Confirm budget owner", 1).await;
        testing::mount_slack(&server, 1).await;

        let event = NormalizedEvent::property_change(
            ObjectType::Deal,
            "900",
            "dealstage",
            "contractsent",
            Utc::now(),
        )
        .unwrap();
        PrepWorkflow::new(testing::workflow_context(&server))
            .run(event)
            .await
            .unwrap();

        let posted = testing::bodies(&server, "/chat.postMessage").await;
        assert_eq!(
            posted[0]["text"],
            ":briefcase: *Acme expansion* moved to `contractsent`\n\n- Confirm budget owner"
        );
    }

    #[tokio::test]
    async fn missing_deal_fails_the_precondition() {
        let server = MockServer::start().await;
        testing::mount_claude(&server, "unused", 0).await;
        testing::mount_slack(&server, 0).await;

        let event = NormalizedEvent::creation(ObjectType::Deal, "901", Utc::now()).unwrap();
        let err = PrepWorkflow::new(testing::workflow_context(&server))
            .run(event)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Precondition(ref m) if m == "deal 901 not found"));
    }
}
