use std::time::Duration;

use thiserror::Error;

use crate::workflow::WorkflowId;

/// A sub-event that cannot be normalized. Rejects that sub-event only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedEventError {
    #[error("sub-event is not a JSON object")]
    NotAnObject,

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' has the wrong shape: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("'{0}' events must not carry a changed property")]
    UnexpectedProperty(String),
}

/// A delivery body that cannot be split into sub-events at all.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("delivery body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("delivery must be a JSON object or array, got {0}")]
    UnexpectedShape(&'static str),
}

/// Errors raised by a workflow body.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A workflow-specific precondition was not met (e.g. the record is gone).
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The event is not something this workflow can handle.
    #[error("unsupported event: {0}")]
    UnsupportedEvent(String),

    /// A third-party collaborator (CRM, LLM, chat) call failed.
    #[error("{service} request failed: {message}")]
    Upstream { service: &'static str, message: String },
}

/// Faults caught at the execution-unit boundary.
#[derive(Debug, Error)]
pub enum ExecutionFault {
    #[error("workflow panicked: {0}")]
    Panicked(String),

    #[error("workflow timed out after {0:?}")]
    TimedOut(Duration),

    #[error("workflow task was cancelled")]
    Cancelled,
}

/// Anything that turns an execution unit into a `failed` outcome.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Fault(#[from] ExecutionFault),
}

/// Failure while delivering a failure report. Logged and swallowed.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification transport error: {0}")]
    Transport(String),

    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Startup-time dispatch wiring errors.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("rule table targets workflow '{0}' but no handler is registered for it")]
    UnregisteredWorkflow(WorkflowId),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse config file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("invalid routing rule #{index}: {reason}")]
    InvalidRule { index: usize, reason: String },

    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_event_display() {
        let err = MalformedEventError::MissingField("propertyName");
        assert_eq!(err.to_string(), "missing required field 'propertyName'");
    }

    #[test]
    fn test_execution_error_is_transparent() {
        let err: ExecutionError = WorkflowError::Precondition("contact 9 not found".to_string()).into();
        assert_eq!(err.to_string(), "precondition failed: contact 9 not found");

        let err: ExecutionError = ExecutionFault::TimedOut(Duration::from_secs(2)).into();
        assert_eq!(err.to_string(), "workflow timed out after 2s");
    }

    #[test]
    fn test_dispatch_error_display() {
        let err = DispatchError::UnregisteredWorkflow(WorkflowId::prep());
        assert!(err.to_string().contains("'prep'"));
    }
}
