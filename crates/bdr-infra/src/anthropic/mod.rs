//! Anthropic Messages API client.

pub mod client;
pub mod types;

pub use client::ClaudeClient;
