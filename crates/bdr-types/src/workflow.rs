//! Workflow identifiers.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Name of an automation workflow, as referenced by routing rules and the
/// workflow registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(String);

impl WorkflowId {
    /// Contact enrichment on creation.
    pub const ENRICH: &'static str = "enrich";
    /// Outreach email draft when a contact becomes sales-ready.
    pub const DRAFT: &'static str = "draft";
    /// Deal briefing on stage change.
    pub const PREP: &'static str = "prep";
    /// Next-step suggestion on engagement.
    pub const FOLLOWUP: &'static str = "followup";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn enrich() -> Self {
        Self::new(Self::ENRICH)
    }

    pub fn draft() -> Self {
        Self::new(Self::DRAFT)
    }

    pub fn prep() -> Self {
        Self::new(Self::PREP)
    }

    pub fn followup() -> Self {
        Self::new(Self::FOLLOWUP)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkflowId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
