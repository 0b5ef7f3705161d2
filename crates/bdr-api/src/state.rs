//! Application state wiring the dispatcher together.
//!
//! AppState holds the dispatcher (router + workflow registry + failure sink)
//! and the loaded configuration. It is shared by the HTTP handlers.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use bdr_core::dispatch::{BoxFailureSink, Dispatcher, LogFailureSink};
use bdr_core::routing::Router;
use bdr_core::workflow::WorkflowRegistry;
use bdr_infra::anthropic::ClaudeClient;
use bdr_infra::hubspot::HubSpotClient;
use bdr_infra::secret::Credentials;
use bdr_infra::slack::{SlackClient, SlackFailureSink};
use bdr_infra::workflow::{WorkflowContext, bdr_registry, dry_run_registry};
use bdr_types::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build clients, registry and dispatcher from configuration.
    ///
    /// In dry-run mode no credentials are required: every routed workflow is
    /// replaced by a log-only handler, and failures go to Slack only when a
    /// bot token happens to be set. Otherwise all three credentials must be
    /// present.
    pub fn init(config: AppConfig, credentials: &Credentials) -> anyhow::Result<Self> {
        let rules = Arc::new(config.rules.clone());

        let slack = match credentials.slack() {
            Ok(token) => Some(Arc::new(SlackClient::new(token, &config.slack)?)),
            Err(_) => None,
        };

        let registry = if config.dispatch.dry_run {
            tracing::warn!("dry-run mode: workflows will be logged, not executed");
            dry_run_registry(rules.workflows())
        } else {
            let missing = credentials.missing();
            if !missing.is_empty() {
                anyhow::bail!(
                    "missing credentials: {} (set them or enable dispatch.dry_run)",
                    missing.join(", ")
                );
            }
            let slack = slack
                .clone()
                .context("Slack client unavailable")?;
            vendor_registry(&config, credentials, slack)?
        };

        let sink = match &slack {
            Some(slack) => BoxFailureSink::new(SlackFailureSink::new(Arc::clone(slack))),
            None => BoxFailureSink::new(LogFailureSink),
        };

        let dispatcher = Dispatcher::new(Router::new(rules), Arc::new(registry), sink)?
            .with_execution_timeout(execution_timeout(&config));

        tracing::info!(
            rules = config.rules.len(),
            dry_run = config.dispatch.dry_run,
            ?dispatcher,
            "dispatcher ready"
        );

        Ok(Self::from_parts(config, dispatcher))
    }

    pub fn from_parts(config: AppConfig, dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            config: Arc::new(config),
        }
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.config.dispatch.shutdown_grace_secs)
    }
}

fn vendor_registry(
    config: &AppConfig,
    credentials: &Credentials,
    slack: Arc<SlackClient>,
) -> anyhow::Result<WorkflowRegistry> {
    let hubspot = HubSpotClient::new(credentials.hubspot()?, &config.hubspot)?;
    let claude = ClaudeClient::new(credentials.anthropic()?, &config.anthropic)?;
    let context = Arc::new(WorkflowContext::new(hubspot, claude, slack, config));
    Ok(bdr_registry(context))
}

/// `execution_timeout_secs = 0` disables the limit.
fn execution_timeout(config: &AppConfig) -> Option<Duration> {
    match config.dispatch.execution_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    }
}
