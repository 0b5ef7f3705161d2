//! Environment variable credentials.
//!
//! Reads the three vendor credentials once at startup:
//! - `HUBSPOT_API_KEY` -- HubSpot private app token
//! - `ANTHROPIC_API_KEY` -- Anthropic Messages API key
//! - `SLACK_BOT_TOKEN` -- Slack bot token (`xoxb-...`)
//!
//! An unset, empty or non-Unicode variable counts as missing.

use std::fmt;

use bdr_types::error::ConfigError;
use secrecy::{ExposeSecret, SecretString};

pub const HUBSPOT_API_KEY: &str = "HUBSPOT_API_KEY";
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const SLACK_BOT_TOKEN: &str = "SLACK_BOT_TOKEN";

/// Vendor credentials. `Debug` shows only which ones are set.
#[derive(Default)]
pub struct Credentials {
    hubspot_api_key: Option<SecretString>,
    anthropic_api_key: Option<SecretString>,
    slack_bot_token: Option<SecretString>,
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary lookup (tests, alternate sources).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .map(SecretString::from)
        };

        Self {
            hubspot_api_key: read(HUBSPOT_API_KEY),
            anthropic_api_key: read(ANTHROPIC_API_KEY),
            slack_bot_token: read(SLACK_BOT_TOKEN),
        }
    }

    pub fn hubspot(&self) -> Result<SecretString, ConfigError> {
        require(&self.hubspot_api_key, HUBSPOT_API_KEY)
    }

    pub fn anthropic(&self) -> Result<SecretString, ConfigError> {
        require(&self.anthropic_api_key, ANTHROPIC_API_KEY)
    }

    pub fn slack(&self) -> Result<SecretString, ConfigError> {
        require(&self.slack_bot_token, SLACK_BOT_TOKEN)
    }

    /// Names of the variables that are not set.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (HUBSPOT_API_KEY, self.hubspot_api_key.is_some()),
            (ANTHROPIC_API_KEY, self.anthropic_api_key.is_some()),
            (SLACK_BOT_TOKEN, self.slack_bot_token.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| (!present).then_some(name))
        .collect()
    }
}

/// Hand out an owned copy; each client keeps its own `SecretString`.
fn require(slot: &Option<SecretString>, name: &'static str) -> Result<SecretString, ConfigError> {
    slot.as_ref()
        .map(|secret| SecretString::from(secret.expose_secret().to_owned()))
        .ok_or(ConfigError::MissingCredential(name))
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = |s: &Option<SecretString>| if s.is_some() { "set" } else { "unset" };
        f.debug_struct("Credentials")
            .field("hubspot_api_key", &state(&self.hubspot_api_key))
            .field("anthropic_api_key", &state(&self.anthropic_api_key))
            .field("slack_bot_token", &state(&self.slack_bot_token))
            .finish()
    }
}
