//! Workflow executor contract and the startup-time registry.
//!
//! - `handler` -- `WorkflowHandler` trait plus `BoxWorkflowHandler` for dynamic dispatch
//! - `registry` -- immutable `WorkflowId -> handler` mapping

pub mod handler;
pub mod registry;

pub use handler::{BoxWorkflowHandler, WorkflowHandler};
pub use registry::WorkflowRegistry;
