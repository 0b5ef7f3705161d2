//! Slack Web API client and the Slack-backed failure sink.

pub mod client;
pub mod sink;

pub use client::SlackClient;
pub use sink::SlackFailureSink;
