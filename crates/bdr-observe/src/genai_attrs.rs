//! OpenTelemetry GenAI semantic convention values.
//!
//! Span field names follow the `gen_ai.*` convention and are written inline
//! at the call site (`gen_ai.request.model = %model`). The constants here are
//! the well-known attribute values, shared so every LLM span reports them the
//! same way.

/// `gen_ai.operation.name` for a single-turn completion.
pub const OP_CHAT: &str = "chat";

/// `gen_ai.provider.name` for the Anthropic Messages API.
pub const PROVIDER_ANTHROPIC: &str = "anthropic";

/// Span name for an LLM call: `"{operation} {model}"`.
pub fn span_name(operation: &str, model: &str) -> String {
    format!("{operation} {model}")
}
