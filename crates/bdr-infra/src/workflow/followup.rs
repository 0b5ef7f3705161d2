//! Followup: suggest the next step after a contact engages (email opened,
//! link clicked, notes or activity logged).

use std::sync::Arc;

use bdr_core::workflow::WorkflowHandler;
use bdr_types::error::WorkflowError;
use bdr_types::event::{NormalizedEvent, ObjectType};

use super::context::{WorkflowContext, require_object, trigger_line};
use crate::hubspot::CrmRecord;

const SYSTEM_PROMPT: &str = "You are a business development coach. Recommend exactly one next \
action for the rep and explain it in at most three sentences.";

const PROFILE_FIELDS: &[&str] = &[
    "firstname",
    "lastname",
    "jobtitle",
    "company",
    "lifecyclestage",
    "hs_lead_status",
    "notes_last_updated",
];

pub struct FollowupWorkflow {
    context: Arc<WorkflowContext>,
}

impl FollowupWorkflow {
    pub fn new(context: Arc<WorkflowContext>) -> Self {
        Self { context }
    }
}

impl WorkflowHandler for FollowupWorkflow {
    fn name(&self) -> &str {
        "followup"
    }

    async fn run(&self, event: NormalizedEvent) -> Result<(), WorkflowError> {
        require_object(&event, ObjectType::Contact)?;
        let contact = self.context.fetch_contact(event.object_id()).await?;

        let suggestion = self
            .context
            .claude
            .ask(&followup_prompt(&contact, &event), Some(SYSTEM_PROMPT))
            .await?;

        let text = self.context.with_record_link(
            format!(
                ":bell: *{}* engaged: {}\nSuggested next step: {}",
                contact.display_name(),
                trigger_line(&event),
                suggestion.trim()
            ),
            "contacts",
            &contact.id,
        );
        self.context.notify(&text).await?;

        tracing::info!(contact_id = %contact.id, "follow-up suggestion posted");
        Ok(())
    }
}

pub fn followup_prompt(contact: &CrmRecord, event: &NormalizedEvent) -> String {
    format!(
        "A contact just showed engagement: {}.\n\n{}\n\n\
         What should the rep do next, and when?",
        trigger_line(event),
        contact.describe(PROFILE_FIELDS)
    )
}
