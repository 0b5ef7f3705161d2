//! Shared domain types for the BDR assistant.
//!
//! Normalized CRM events, routing rules, workflow identifiers, dispatch
//! outcomes, configuration and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod event;
pub mod outcome;
pub mod rule;
pub mod workflow;
