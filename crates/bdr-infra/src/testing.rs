//! Mock HubSpot, Anthropic and Slack endpoints for client and workflow tests.
//!
//! One `wiremock` server stands in for all three vendors; their paths do not
//! overlap.

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bdr_types::config::AppConfig;

use crate::anthropic::ClaudeClient;
use crate::hubspot::HubSpotClient;
use crate::slack::SlackClient;
use crate::workflow::WorkflowContext;

pub const HUBSPOT_TOKEN: &str = "pat-test";
pub const ANTHROPIC_KEY: &str = "sk-ant-test";
pub const SLACK_TOKEN: &str = "xoxb-test";

/// Default config with every vendor base URL pointing at `server`.
pub fn config_for(server: &MockServer) -> AppConfig {
    let mut config = AppConfig::default();
    config.hubspot.base_url = server.uri();
    config.anthropic.base_url = server.uri();
    config.slack.base_url = server.uri();
    config
}

pub fn hubspot_client(server: &MockServer) -> HubSpotClient {
    HubSpotClient::new(secret(HUBSPOT_TOKEN), &config_for(server).hubspot).unwrap()
}

pub fn claude_client(server: &MockServer) -> ClaudeClient {
    ClaudeClient::new(secret(ANTHROPIC_KEY), &config_for(server).anthropic).unwrap()
}

pub fn slack_client(server: &MockServer) -> SlackClient {
    SlackClient::new(secret(SLACK_TOKEN), &config_for(server).slack).unwrap()
}

pub fn workflow_context(server: &MockServer) -> Arc<WorkflowContext> {
    let config = config_for(server);
    Arc::new(WorkflowContext::new(
        hubspot_client(server),
        claude_client(server),
        Arc::new(slack_client(server)),
        &config,
    ))
}

/// A Messages API reply whose only content block is `text`.
pub fn claude_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "msg_01test",
        "type": "message",
        "role": "assistant",
        "model": "claude-sonnet-4-20250514",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 42, "output_tokens": 17 }
    }))
}

/// `GET /crm/v3/objects/{object}/{id}` answers with the given properties.
pub async fn mount_record(server: &MockServer, object: &str, id: &str, properties: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/crm/v3/objects/{object}/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "properties": properties,
        })))
        .mount(server)
        .await;
}

/// Claude answers every question with `text`, exactly `calls` times.
pub async fn mount_claude(server: &MockServer, text: &str, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(claude_reply(text))
        .expect(calls)
        .mount(server)
        .await;
}

/// Slack accepts exactly `calls` messages.
pub async fn mount_slack(server: &MockServer, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/chat.postMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "ts": "1.1" })))
        .expect(calls)
        .mount(server)
        .await;
}

/// JSON bodies of every request the server saw on `request_path`. Requests
/// without a body (GETs) are left out.
pub async fn bodies(server: &MockServer, request_path: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == request_path && !request.body.is_empty())
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}

fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}
