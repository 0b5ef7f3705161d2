//! Per-event dispatch outcomes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

use crate::workflow::WorkflowId;

/// Where an event is in the dispatch lifecycle.
///
/// `Scheduled` and `Skipped` are produced synchronously by `submit`;
/// `Failed` and `Succeeded` are terminal statuses of an execution unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchStatus {
    Scheduled,
    Skipped,
    Failed,
    Succeeded,
}

impl fmt::Display for DispatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchStatus::Scheduled => write!(f, "scheduled"),
            DispatchStatus::Skipped => write!(f, "skipped"),
            DispatchStatus::Failed => write!(f, "failed"),
            DispatchStatus::Succeeded => write!(f, "succeeded"),
        }
    }
}

/// Record of what happened to one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// The delivery (one `submit` call) the event arrived in.
    pub delivery_id: Uuid,
    pub object_id: String,
    /// `None` when no rule matched.
    pub workflow: Option<WorkflowId>,
    pub status: DispatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl DispatchOutcome {
    pub fn scheduled(delivery_id: Uuid, object_id: impl Into<String>, workflow: WorkflowId) -> Self {
        Self {
            delivery_id,
            object_id: object_id.into(),
            workflow: Some(workflow),
            status: DispatchStatus::Scheduled,
            error_detail: None,
        }
    }

    pub fn skipped(delivery_id: Uuid, object_id: impl Into<String>) -> Self {
        Self {
            delivery_id,
            object_id: object_id.into(),
            workflow: None,
            status: DispatchStatus::Skipped,
            error_detail: None,
        }
    }

    pub fn succeeded(delivery_id: Uuid, object_id: impl Into<String>, workflow: WorkflowId) -> Self {
        Self {
            status: DispatchStatus::Succeeded,
            ..Self::scheduled(delivery_id, object_id, workflow)
        }
    }

    pub fn failed(
        delivery_id: Uuid,
        object_id: impl Into<String>,
        workflow: WorkflowId,
        error_detail: impl Into<String>,
    ) -> Self {
        Self {
            status: DispatchStatus::Failed,
            error_detail: Some(error_detail.into()),
            ..Self::scheduled(delivery_id, object_id, workflow)
        }
    }

    /// Workflow name for logs, `"unmatched"` when no rule applied.
    pub fn workflow_label(&self) -> &str {
        self.workflow
            .as_ref()
            .map(WorkflowId::as_str)
            .unwrap_or("unmatched")
    }
}
