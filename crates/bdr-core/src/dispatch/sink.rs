//! Failure sink: where `failed` dispatch outcomes are reported.
//!
//! `FailureSink` implementations may fail (Slack down, token revoked).
//! `BoxFailureSink::report` absorbs those failures: it logs them locally and
//! returns `()`, so a broken notifier can never reach back into dispatch.

use std::future::Future;
use std::pin::Pin;

use bdr_types::error::NotifyError;
use bdr_types::outcome::DispatchOutcome;

/// A destination for failure reports.
pub trait FailureSink: Send + Sync {
    fn name(&self) -> &str;

    fn report(
        &self,
        outcome: &DispatchOutcome,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Object-safe version of [`FailureSink`].
pub trait FailureSinkDyn: Send + Sync {
    fn name(&self) -> &str;

    fn report_boxed<'a>(
        &'a self,
        outcome: &'a DispatchOutcome,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>>;
}

impl<T: FailureSink> FailureSinkDyn for T {
    fn name(&self) -> &str {
        FailureSink::name(self)
    }

    fn report_boxed<'a>(
        &'a self,
        outcome: &'a DispatchOutcome,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>> {
        Box::pin(self.report(outcome))
    }
}

/// Type-erased, best-effort failure sink.
pub struct BoxFailureSink {
    inner: Box<dyn FailureSinkDyn + Send + Sync>,
}

impl BoxFailureSink {
    pub fn new<T: FailureSink + 'static>(sink: T) -> Self {
        Self {
            inner: Box::new(sink),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Deliver a report. Never fails: delivery errors are logged and dropped.
    pub async fn report(&self, outcome: &DispatchOutcome) {
        if let Err(e) = self.inner.report_boxed(outcome).await {
            tracing::error!(
                sink = self.name(),
                delivery_id = %outcome.delivery_id,
                object_id = %outcome.object_id,
                workflow = outcome.workflow_label(),
                error = %e,
                "failed to report dispatch failure"
            );
        }
    }
}

impl std::fmt::Debug for BoxFailureSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxFailureSink")
            .field("name", &self.name())
            .finish()
    }
}

/// Sink that only writes failures to the log. Used when no notifier is
/// configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFailureSink;

impl FailureSink for LogFailureSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn report(&self, outcome: &DispatchOutcome) -> Result<(), NotifyError> {
        tracing::error!(
            delivery_id = %outcome.delivery_id,
            object_id = %outcome.object_id,
            workflow = outcome.workflow_label(),
            error = outcome.error_detail.as_deref().unwrap_or(""),
            "workflow execution failed"
        );
        Ok(())
    }
}
