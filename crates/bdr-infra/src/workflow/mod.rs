//! The BDR workflows: `WorkflowHandler` implementations backed by HubSpot,
//! Claude and Slack.
//!
//! - `context` -- shared clients and settings, plus fetch/notify helpers
//! - `enrich` -- score a new contact and write the score back to HubSpot
//! - `draft` -- draft an outreach email when a contact's lead status moves
//! - `prep` -- brief the team when a deal changes stage
//! - `followup` -- suggest a next step after engagement activity
//! - `dry_run` -- log-only stand-in for every workflow

pub mod context;
pub mod draft;
pub mod dry_run;
pub mod enrich;
pub mod followup;
pub mod prep;

use std::sync::Arc;

use bdr_core::workflow::WorkflowRegistry;
use bdr_types::workflow::WorkflowId;

pub use context::WorkflowContext;
pub use draft::DraftWorkflow;
pub use dry_run::DryRunWorkflow;
pub use enrich::EnrichWorkflow;
pub use followup::FollowupWorkflow;
pub use prep::PrepWorkflow;

/// Registry with the four vendor-backed workflows.
pub fn bdr_registry(context: Arc<WorkflowContext>) -> WorkflowRegistry {
    WorkflowRegistry::builder()
        .register(WorkflowId::ENRICH, EnrichWorkflow::new(Arc::clone(&context)))
        .register(WorkflowId::DRAFT, DraftWorkflow::new(Arc::clone(&context)))
        .register(WorkflowId::PREP, PrepWorkflow::new(Arc::clone(&context)))
        .register(WorkflowId::FOLLOWUP, FollowupWorkflow::new(context))
        .build()
}

/// Registry mapping every given id to a [`DryRunWorkflow`].
pub fn dry_run_registry<'a>(ids: impl IntoIterator<Item = &'a WorkflowId>) -> WorkflowRegistry {
    ids.into_iter()
        .fold(WorkflowRegistry::builder(), |builder, id| {
            builder.register(id.clone(), DryRunWorkflow::new(id.clone()))
        })
        .build()
}
