//! WorkflowHandler trait and its type-erased wrapper.
//!
//! Follows the same blanket-impl pattern as the other boxed ports:
//! 1. `WorkflowHandler` uses RPITIT for `run`
//! 2. Object-safe `WorkflowHandlerDyn` returns a boxed future, blanket-impl'd
//! 3. `BoxWorkflowHandler` wraps `Box<dyn WorkflowHandlerDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use bdr_types::error::WorkflowError;
use bdr_types::event::NormalizedEvent;

/// An automation workflow the dispatcher can run.
///
/// Implementations own the event for the duration of the run. The
/// dispatcher only ever calls `run`; it never inspects the concrete type.
pub trait WorkflowHandler: Send + Sync {
    /// Short name for logs (e.g. "enrich").
    fn name(&self) -> &str;

    /// Execute the workflow for one event.
    fn run(
        &self,
        event: NormalizedEvent,
    ) -> impl Future<Output = Result<(), WorkflowError>> + Send;
}

/// Object-safe version of [`WorkflowHandler`] with a boxed future.
pub trait WorkflowHandlerDyn: Send + Sync {
    fn name(&self) -> &str;

    fn run_boxed<'a>(
        &'a self,
        event: NormalizedEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), WorkflowError>> + Send + 'a>>;
}

impl<T: WorkflowHandler> WorkflowHandlerDyn for T {
    fn name(&self) -> &str {
        WorkflowHandler::name(self)
    }

    fn run_boxed<'a>(
        &'a self,
        event: NormalizedEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), WorkflowError>> + Send + 'a>> {
        Box::pin(self.run(event))
    }
}

/// Type-erased workflow handler stored in the registry.
pub struct BoxWorkflowHandler {
    inner: Box<dyn WorkflowHandlerDyn + Send + Sync>,
}

impl BoxWorkflowHandler {
    pub fn new<T: WorkflowHandler + 'static>(handler: T) -> Self {
        Self {
            inner: Box::new(handler),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn run(&self, event: NormalizedEvent) -> Result<(), WorkflowError> {
        self.inner.run_boxed(event).await
    }
}

impl std::fmt::Debug for BoxWorkflowHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxWorkflowHandler")
            .field("name", &self.name())
            .finish()
    }
}
