//! Draft: write a personalized outreach email when a contact's lifecycle
//! stage or lead status moves, and post it to Slack for a rep to send.

use std::sync::Arc;

use bdr_core::workflow::WorkflowHandler;
use bdr_types::error::WorkflowError;
use bdr_types::event::{NormalizedEvent, ObjectType};

use super::context::{WorkflowContext, require_object, trigger_line};
use crate::hubspot::CrmRecord;

const SYSTEM_PROMPT: &str = "You are a business development representative writing short, \
specific, friendly B2B outreach emails. Never invent facts about the recipient. Start with a \
'Subject:' line.";

const PROFILE_FIELDS: &[&str] = &[
    "firstname",
    "lastname",
    "jobtitle",
    "company",
    "industry",
    "lifecyclestage",
    "hs_lead_status",
];

pub struct DraftWorkflow {
    context: Arc<WorkflowContext>,
}

impl DraftWorkflow {
    pub fn new(context: Arc<WorkflowContext>) -> Self {
        Self { context }
    }
}

impl WorkflowHandler for DraftWorkflow {
    fn name(&self) -> &str {
        "draft"
    }

    async fn run(&self, event: NormalizedEvent) -> Result<(), WorkflowError> {
        require_object(&event, ObjectType::Contact)?;
        let contact = self.context.fetch_contact(event.object_id()).await?;

        let draft = self
            .context
            .claude
            .ask(&draft_prompt(&contact, &event), Some(SYSTEM_PROMPT))
            .await?;

        let text = self.context.with_record_link(
            format!(
                ":email: Draft for *{}* ({})\n\n{}",
                contact.display_name(),
                trigger_line(&event),
                draft.trim()
            ),
            "contacts",
            &contact.id,
        );
        self.context.notify(&text).await?;

        tracing::info!(contact_id = %contact.id, "outreach draft posted");
        Ok(())
    }
}

pub fn draft_prompt(contact: &CrmRecord, event: &NormalizedEvent) -> String {
    format!(
        "Write a first-touch outreach email to this contact.\n\n{}\n\n\
         What just happened in the CRM: {}.\n\
         Keep it under 120 words with one clear call to action.",
        contact.describe(PROFILE_FIELDS),
        trigger_line(event)
    )
}
