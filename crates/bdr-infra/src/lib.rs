//! Infrastructure layer for the BDR assistant.
//!
//! Implements the ports defined in `bdr-core` against real services:
//! config file loading, environment credentials, the HubSpot, Anthropic and
//! Slack HTTP clients, the Slack failure sink, and the four BDR workflows.

pub mod anthropic;
pub mod config;
pub mod error;
pub mod hubspot;
pub mod secret;
pub mod slack;
pub mod workflow;

#[cfg(test)]
mod testing;
