//! Configuration types for the BDR assistant.
//!
//! `AppConfig` mirrors the TOML config file. Every section and field has a
//! default, so an empty file (or no file) is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::rule::RuleTable;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub dispatch: DispatchConfig,
    pub slack: SlackConfig,
    pub hubspot: HubSpotConfig,
    pub anthropic: AnthropicConfig,
    pub workflows: WorkflowsConfig,
    /// Routing rules in evaluation order.
    pub rules: RuleTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Per execution unit limit in seconds. `0` disables the timeout.
    pub execution_timeout_secs: u64,
    /// How long shutdown waits for in-flight workflows.
    pub shutdown_grace_secs: u64,
    /// Register log-only workflows instead of the vendor-backed ones.
    pub dry_run: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            execution_timeout_secs: 300,
            shutdown_grace_secs: 30,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Channel receiving dispatch failure reports.
    pub alert_channel: String,
    /// Channel receiving workflow output (drafts, briefings, suggestions).
    pub notify_channel: String,
    pub base_url: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            alert_channel: "#bdr-alerts".to_string(),
            notify_channel: "#bdr-assistant".to_string(),
            base_url: "https://slack.com/api".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubSpotConfig {
    pub portal_id: Option<String>,
    pub base_url: String,
}

impl Default for HubSpotConfig {
    fn default() -> Self {
        Self {
            portal_id: None,
            base_url: "https://api.hubapi.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 1024,
            base_url: "https://api.anthropic.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowsConfig {
    /// Enrichment scores at or above this are announced in Slack.
    pub high_priority_score: u8,
}

impl Default for WorkflowsConfig {
    fn default() -> Self {
        Self {
            high_priority_score: 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.dispatch.execution_timeout_secs, 300);
        assert_eq!(config.workflows.high_priority_score, 7);
        assert_eq!(config.rules.len(), 4);
    }

    #[test]
    fn test_app_config_deserialize_empty() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(!config.dispatch.dry_run);
        assert_eq!(config.rules, RuleTable::default());
    }

    #[test]
    fn test_app_config_partial_sections() {
        let config: AppConfig = toml::from_str(
            r#"
[server]
port = 9000

[dispatch]
dry_run = true

[[rules]]
object_type = "contact"
event_type = "creation"
workflow = "enrich"
"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.dispatch.dry_run);
        assert_eq!(config.dispatch.shutdown_grace_secs, 30);
        assert_eq!(config.rules.len(), 1);
    }
}
