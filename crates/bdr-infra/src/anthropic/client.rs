//! ClaudeClient -- single-turn questions against the Anthropic Messages API.
//!
//! Sends `POST /v1/messages` with the `x-api-key` and `anthropic-version`
//! headers. Each call runs inside a `gen_ai.chat` span carrying the GenAI
//! semantic convention attributes (model, token usage, response id).
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::Instrument;

use bdr_observe::genai_attrs;
use bdr_types::config::AnthropicConfig;

use super::types::{MessageParam, MessagesRequest, MessagesResponse};
use crate::error::{ClientError, ensure_success, http_client};

const SERVICE: &str = "anthropic";

/// Anthropic Claude client.
pub struct ClaudeClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeClient {
    /// The Anthropic API version header value.
    const API_VERSION: &'static str = "2023-06-01";

    pub fn new(api_key: SecretString, config: &AnthropicConfig) -> Result<Self, ClientError> {
        Ok(Self {
            // Long generations can take minutes.
            client: http_client(SERVICE, Duration::from_secs(300))?,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask Claude a single question and return the text of the answer.
    pub async fn ask(&self, prompt: &str, system: Option<&str>) -> Result<String, ClientError> {
        let span = tracing::info_span!(
            "gen_ai.chat",
            otel.name = %genai_attrs::span_name(genai_attrs::OP_CHAT, &self.model),
            gen_ai.operation.name = genai_attrs::OP_CHAT,
            gen_ai.provider.name = genai_attrs::PROVIDER_ANTHROPIC,
            gen_ai.request.model = %self.model,
            gen_ai.request.max_tokens = self.max_tokens,
            gen_ai.response.id = tracing::field::Empty,
            gen_ai.response.finish_reasons = tracing::field::Empty,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
        );

        async {
            let response = self.send(prompt, system).await?;

            let span = tracing::Span::current();
            span.record("gen_ai.response.id", response.id.as_str());
            if let Some(reason) = response.stop_reason.as_deref() {
                span.record("gen_ai.response.finish_reasons", reason);
            }
            span.record("gen_ai.usage.input_tokens", response.usage.input_tokens);
            span.record("gen_ai.usage.output_tokens", response.usage.output_tokens);

            let text = response.text();
            if text.trim().is_empty() {
                return Err(ClientError::Decode {
                    service: SERVICE,
                    message: "response contained no text".to_string(),
                });
            }
            Ok(text)
        }
        .instrument(span)
        .await
    }

    fn request<'a>(&'a self, prompt: &'a str, system: Option<&'a str>) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![MessageParam {
                role: "user",
                content: prompt,
            }],
            system,
        }
    }

    async fn send(&self, prompt: &str, system: Option<&str>) -> Result<MessagesResponse, ClientError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", Self::API_VERSION)
            .json(&self.request(prompt, system))
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                service: SERVICE,
                message: e.to_string(),
            })?;

        let response = ensure_success(SERVICE, response).await?;
        response
            .json::<MessagesResponse>()
            .await
            .map_err(|e| ClientError::Decode {
                service: SERVICE,
                message: e.to_string(),
            })
    }
}

impl std::fmt::Debug for ClaudeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaudeClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}
