//! Enrich: qualify a newly created contact.
//!
//! Claude scores the lead from 1 to 10 with a one-paragraph rationale. The
//! score and rationale are written back to the contact, and leads at or
//! above the configured threshold are announced in Slack.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use bdr_core::workflow::WorkflowHandler;
use bdr_types::error::WorkflowError;
use bdr_types::event::{NormalizedEvent, ObjectType};

use super::context::{WorkflowContext, require_object};
use crate::hubspot::CrmRecord;

/// HubSpot contact property receiving the score.
pub const SCORE_PROPERTY: &str = "bdr_priority_score";
/// HubSpot contact property receiving the rationale.
pub const SUMMARY_PROPERTY: &str = "bdr_enrichment_summary";

const SYSTEM_PROMPT: &str = "You are a business development assistant who qualifies inbound B2B \
leads. Judge fit from role, seniority, company and industry. Answer with a single JSON object \
and nothing else.";

const PROFILE_FIELDS: &[&str] = &[
    "firstname",
    "lastname",
    "email",
    "jobtitle",
    "company",
    "industry",
    "lifecyclestage",
];

pub struct EnrichWorkflow {
    context: Arc<WorkflowContext>,
}

impl EnrichWorkflow {
    pub fn new(context: Arc<WorkflowContext>) -> Self {
        Self { context }
    }
}

impl WorkflowHandler for EnrichWorkflow {
    fn name(&self) -> &str {
        "enrich"
    }

    async fn run(&self, event: NormalizedEvent) -> Result<(), WorkflowError> {
        require_object(&event, ObjectType::Contact)?;
        let contact = self.context.fetch_contact(event.object_id()).await?;

        let answer = self
            .context
            .claude
            .ask(&enrichment_prompt(&contact), Some(SYSTEM_PROMPT))
            .await?;
        let enrichment = parse_enrichment(&answer).ok_or_else(|| WorkflowError::Upstream {
            service: "anthropic",
            message: "answer did not contain a usable score".to_string(),
        })?;

        tracing::info!(
            contact_id = %contact.id,
            score = enrichment.score,
            "contact enriched"
        );

        let properties = BTreeMap::from([
            (SCORE_PROPERTY.to_string(), enrichment.score.to_string()),
            (SUMMARY_PROPERTY.to_string(), enrichment.summary.clone()),
        ]);
        self.context
            .hubspot
            .update_contact(&contact.id, &properties)
            .await?;

        if enrichment.score >= self.context.high_priority_score {
            let text = self.context.with_record_link(
                high_priority_message(&contact, &enrichment),
                "contacts",
                &contact.id,
            );
            self.context.notify(&text).await?;
        }

        Ok(())
    }
}

/// Claude's verdict on a lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    /// 1..=10
    pub score: u8,
    pub summary: String,
}

#[derive(Deserialize)]
struct RawEnrichment {
    score: f64,
    #[serde(default)]
    summary: String,
}

pub fn enrichment_prompt(contact: &CrmRecord) -> String {
    let profile = contact.describe(PROFILE_FIELDS);
    let profile = if profile.is_empty() {
        "(no profile fields are filled in)".to_string()
    } else {
        profile
    };

    format!(
        "A new contact was just created in our CRM.\n\n{profile}\n\n\
         Rate how promising this lead is for outbound follow-up on a scale of 1 to 10 \
         and explain why in two or three sentences.\n\
         Reply as JSON: {{\"score\": <1-10>, \"summary\": \"<rationale>\"}}"
    )
}

/// Pull the JSON object out of Claude's answer. Tolerates surrounding prose
/// and code fences; clamps the score into 1..=10.
pub fn parse_enrichment(answer: &str) -> Option<Enrichment> {
    let start = answer.find('{')?;
    let end = answer.rfind('}')?;
    if end < start {
        return None;
    }

    let raw: RawEnrichment = serde_json::from_str(&answer[start..=end]).ok()?;
    if !raw.score.is_finite() {
        return None;
    }

    Some(Enrichment {
        score: raw.score.round().clamp(1.0, 10.0) as u8,
        summary: raw.summary.trim().to_string(),
    })
}

fn high_priority_message(contact: &CrmRecord, enrichment: &Enrichment) -> String {
    let mut text = format!(
        ":star: High-priority lead: *{}* scored {}/10",
        contact.display_name(),
        enrichment.score
    );
    if let Some(company) = contact.property("company") {
        text.push_str(&format!(" ({company})"));
    }
    if !enrichment.summary.is_empty() {
        text.push_str(&format!("\n{}", enrichment.summary));
    }
    text
}
