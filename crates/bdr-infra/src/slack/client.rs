//! SlackClient -- posts messages through `chat.postMessage`.
//!
//! Slack answers HTTP 200 even for rejected calls and reports the problem as
//! `{"ok": false, "error": "..."}`, so the body is always inspected.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use bdr_types::config::SlackConfig;

use crate::error::{ClientError, ensure_success, http_client};

const SERVICE: &str = "slack";

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Slack bot client.
pub struct SlackClient {
    client: reqwest::Client,
    token: SecretString,
    base_url: String,
    alert_channel: String,
}

impl SlackClient {
    pub fn new(token: SecretString, config: &SlackConfig) -> Result<Self, ClientError> {
        Ok(Self {
            client: http_client(SERVICE, Duration::from_secs(15))?,
            token,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            alert_channel: config.alert_channel.clone(),
        })
    }

    /// Post `text` to `channel` (name or id).
    pub async fn post_message(&self, channel: &str, text: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .post(format!("{}/chat.postMessage", self.base_url))
            .bearer_auth(self.token.expose_secret())
            .json(&PostMessage { channel, text })
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                service: SERVICE,
                message: e.to_string(),
            })?;

        let response = ensure_success(SERVICE, response).await?;
        let body = response
            .json::<SlackResponse>()
            .await
            .map_err(|e| ClientError::Decode {
                service: SERVICE,
                message: e.to_string(),
            })?;

        check_ok(body)?;
        tracing::debug!(channel, "posted slack message");
        Ok(())
    }

    /// Post an error report to the alert channel.
    pub async fn post_error(
        &self,
        message: &str,
        context: &[(&str, String)],
    ) -> Result<(), ClientError> {
        self.post_message(&self.alert_channel, &format_error(message, context))
            .await
    }
}

fn check_ok(body: SlackResponse) -> Result<(), ClientError> {
    if body.ok {
        Ok(())
    } else {
        Err(ClientError::Rejected {
            service: SERVICE,
            reason: body.error.unwrap_or_else(|| "unknown_error".to_string()),
        })
    }
}

/// `:rotating_light: <message>` followed by one `key: value` bullet per
/// context entry.
pub fn format_error(message: &str, context: &[(&str, String)]) -> String {
    let mut text = format!(":rotating_light: *{message}*");
    for (key, value) in context {
        text.push_str(&format!("\n• {key}: `{value}`"));
    }
    text
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("base_url", &self.base_url)
            .field("alert_channel", &self.alert_channel)
            .finish_non_exhaustive()
    }
}
