//! HTTP layer for the BDR assistant.
//!
//! Axum server receiving HubSpot and Slack webhooks. Success replies are the
//! small acknowledgments the vendors expect; errors use a JSON envelope.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
