//! Static mapping from workflow id to handler, built once at startup.

use std::collections::BTreeMap;
use std::sync::Arc;

use bdr_types::workflow::WorkflowId;

use super::handler::{BoxWorkflowHandler, WorkflowHandler};

/// Immutable workflow registry.
///
/// Built with [`WorkflowRegistry::builder`]; there is no way to add or remove
/// handlers afterwards.
#[derive(Debug, Default)]
pub struct WorkflowRegistry {
    handlers: BTreeMap<WorkflowId, Arc<BoxWorkflowHandler>>,
}

impl WorkflowRegistry {
    pub fn builder() -> WorkflowRegistryBuilder {
        WorkflowRegistryBuilder::default()
    }

    pub fn get(&self, id: &WorkflowId) -> Option<Arc<BoxWorkflowHandler>> {
        self.handlers.get(id).cloned()
    }

    pub fn contains(&self, id: &WorkflowId) -> bool {
        self.handlers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &WorkflowId> {
        self.handlers.keys()
    }
}

/// Collects `(workflow id -> handler)` registrations.
#[derive(Default)]
pub struct WorkflowRegistryBuilder {
    handlers: BTreeMap<WorkflowId, Arc<BoxWorkflowHandler>>,
}

impl WorkflowRegistryBuilder {
    /// Register a handler. A later registration for the same id replaces
    /// the earlier one.
    pub fn register<T: WorkflowHandler + 'static>(
        mut self,
        id: impl Into<WorkflowId>,
        handler: T,
    ) -> Self {
        let id = id.into();
        tracing::debug!(workflow = %id, handler = handler.name(), "registered workflow handler");
        self.handlers.insert(id, Arc::new(BoxWorkflowHandler::new(handler)));
        self
    }

    pub fn build(self) -> WorkflowRegistry {
        WorkflowRegistry {
            handlers: self.handlers,
        }
    }
}
