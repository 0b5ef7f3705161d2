//! Errors shared by the vendor HTTP clients.

use bdr_types::error::{NotifyError, WorkflowError};
use thiserror::Error;

/// A failed call to HubSpot, Anthropic or Slack.
///
/// `service` names the vendor so logs and failure reports say which
/// collaborator broke.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{service}: HTTP request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },

    #[error("{service}: HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service}: authentication failed")]
    Unauthorized { service: &'static str },

    #[error("{service}: rate limited")]
    RateLimited { service: &'static str },

    /// The API answered 200 but reported an error in the body (Slack's `ok: false`).
    #[error("{service}: request rejected: {reason}")]
    Rejected {
        service: &'static str,
        reason: String,
    },

    #[error("{service}: failed to decode response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("{service}: invalid URL: {message}")]
    InvalidUrl {
        service: &'static str,
        message: String,
    },
}

impl ClientError {
    pub fn service(&self) -> &'static str {
        match self {
            ClientError::Transport { service, .. }
            | ClientError::Status { service, .. }
            | ClientError::Unauthorized { service }
            | ClientError::RateLimited { service }
            | ClientError::Rejected { service, .. }
            | ClientError::Decode { service, .. }
            | ClientError::InvalidUrl { service, .. } => service,
        }
    }

    /// Map a non-success HTTP status to the matching variant.
    pub(crate) fn from_status(service: &'static str, status: u16, body: String) -> Self {
        match status {
            401 | 403 => ClientError::Unauthorized { service },
            429 => ClientError::RateLimited { service },
            _ => ClientError::Status {
                service,
                status,
                body,
            },
        }
    }
}

impl From<ClientError> for WorkflowError {
    fn from(err: ClientError) -> Self {
        WorkflowError::Upstream {
            service: err.service(),
            message: err.to_string(),
        }
    }
}

impl From<ClientError> for NotifyError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Rejected { reason, .. } => NotifyError::Rejected(reason),
            other => NotifyError::Transport(other.to_string()),
        }
    }
}

/// Build a `reqwest::Client` with the given request timeout.
pub(crate) fn http_client(
    service: &'static str,
    timeout: std::time::Duration,
) -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ClientError::Transport {
            service,
            message: format!("failed to build HTTP client: {e}"),
        })
}

/// Turn a non-2xx response into a [`ClientError`], keeping the body for logs.
pub(crate) async fn ensure_success(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::from_status(service, status.as_u16(), body))
}
