//! Observability for the BDR assistant.
//!
//! - `tracing_setup` -- global subscriber (text or JSON) with optional OTel export
//! - `genai_attrs` -- attribute values for LLM call spans

pub mod genai_attrs;
pub mod tracing_setup;

pub use tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};
