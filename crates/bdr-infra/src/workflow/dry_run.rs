//! Log-only workflow used in dry-run mode and when credentials are absent.

use bdr_core::workflow::WorkflowHandler;
use bdr_types::error::WorkflowError;
use bdr_types::event::NormalizedEvent;
use bdr_types::workflow::WorkflowId;

/// Logs the event it would have handled and succeeds.
#[derive(Debug, Clone)]
pub struct DryRunWorkflow {
    workflow: WorkflowId,
}

impl DryRunWorkflow {
    pub fn new(workflow: WorkflowId) -> Self {
        Self { workflow }
    }
}

impl WorkflowHandler for DryRunWorkflow {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn run(&self, event: NormalizedEvent) -> Result<(), WorkflowError> {
        tracing::info!(
            workflow = %self.workflow,
            object_id = event.object_id(),
            subscription_type = %event.subscription_type(),
            property = event.changed_property().unwrap_or(""),
            value = event.property_value().unwrap_or(""),
            "dry run: workflow not executed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdr_types::event::ObjectType;
    use chrono::Utc;

    #[tokio::test]
    async fn dry_run_always_succeeds() {
        let workflow = DryRunWorkflow::new(WorkflowId::draft());
        let event = NormalizedEvent::property_change(
            ObjectType::Contact,
            "1",
            "hs_lead_status",
            "CONNECTED",
            Utc::now(),
        )
        .unwrap();

        assert!(workflow.run(event).await.is_ok());
    }
}
