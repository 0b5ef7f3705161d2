//! Shared dependencies for the BDR workflows.

use std::sync::Arc;

use bdr_types::config::AppConfig;
use bdr_types::error::WorkflowError;
use bdr_types::event::{NormalizedEvent, ObjectType};

use crate::anthropic::ClaudeClient;
use crate::hubspot::{CrmRecord, HubSpotClient};
use crate::slack::SlackClient;

/// Clients and settings every workflow needs. Shared behind an `Arc`.
#[derive(Debug)]
pub struct WorkflowContext {
    pub hubspot: HubSpotClient,
    pub claude: ClaudeClient,
    pub slack: Arc<SlackClient>,
    pub notify_channel: String,
    pub high_priority_score: u8,
}

impl WorkflowContext {
    pub fn new(
        hubspot: HubSpotClient,
        claude: ClaudeClient,
        slack: Arc<SlackClient>,
        config: &AppConfig,
    ) -> Self {
        Self {
            hubspot,
            claude,
            slack,
            notify_channel: config.slack.notify_channel.clone(),
            high_priority_score: config.workflows.high_priority_score,
        }
    }

    /// Fetch the contact, treating "not found" as a failed precondition.
    pub async fn fetch_contact(&self, contact_id: &str) -> Result<CrmRecord, WorkflowError> {
        self.hubspot
            .get_contact(contact_id)
            .await?
            .ok_or_else(|| WorkflowError::Precondition(format!("contact {contact_id} not found")))
    }

    /// Fetch the deal, treating "not found" as a failed precondition.
    pub async fn fetch_deal(&self, deal_id: &str) -> Result<CrmRecord, WorkflowError> {
        self.hubspot
            .get_deal(deal_id)
            .await?
            .ok_or_else(|| WorkflowError::Precondition(format!("deal {deal_id} not found")))
    }

    /// Post workflow output to the notify channel.
    pub async fn notify(&self, text: &str) -> Result<(), WorkflowError> {
        self.slack.post_message(&self.notify_channel, text).await?;
        Ok(())
    }

    /// `text`, with a link to the record appended when the portal is known.
    pub fn with_record_link(&self, text: String, object: &str, object_id: &str) -> String {
        match self.hubspot.record_url(object, object_id) {
            Some(url) => format!("{text}\n<{url}|Open in HubSpot>"),
            None => text,
        }
    }
}

/// Reject events about the wrong kind of record.
pub fn require_object(event: &NormalizedEvent, expected: ObjectType) -> Result<(), WorkflowError> {
    if *event.object_type() == expected {
        Ok(())
    } else {
        Err(WorkflowError::UnsupportedEvent(format!(
            "expected a {expected} event, got {}",
            event.subscription_type()
        )))
    }
}

/// One line describing what triggered the workflow.
pub fn trigger_line(event: &NormalizedEvent) -> String {
    match event.change() {
        Some(change) if change.value.is_empty() => format!("`{}` was cleared", change.name),
        Some(change) => format!("`{}` changed to `{}`", change.name, change.value),
        None => format!("{} event", event.subscription_type()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn require_object_rejects_other_kinds() {
        let deal = NormalizedEvent::creation(ObjectType::Deal, "5", Utc::now()).unwrap();
        assert!(require_object(&deal, ObjectType::Deal).is_ok());

        let err = require_object(&deal, ObjectType::Contact).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported event: expected a contact event, got deal.creation"
        );
    }

    #[test]
    fn trigger_line_describes_change() {
        let at = Utc::now();
        let change =
            NormalizedEvent::property_change(ObjectType::Deal, "5", "dealstage", "closedwon", at)
                .unwrap();
        assert_eq!(trigger_line(&change), "`dealstage` changed to `closedwon`");

        let cleared =
            NormalizedEvent::property_change(ObjectType::Contact, "5", "hs_lead_status", "", at)
                .unwrap();
        assert_eq!(trigger_line(&cleared), "`hs_lead_status` was cleared");

        let created = NormalizedEvent::creation(ObjectType::Contact, "5", at).unwrap();
        assert_eq!(trigger_line(&created), "contact.creation event");
    }
}
