//! Outcome bus: every `DispatchOutcome` the dispatcher records, fanned out
//! over `tokio::sync::broadcast`.
//!
//! The server runs [`log_outcomes`] as its standing subscriber, which writes
//! one structured `bdr::outcome` record per outcome. Receivers that fall
//! behind lose the oldest outcomes; the loss is counted and logged, never
//! propagated back to the dispatcher.

use bdr_types::outcome::{DispatchOutcome, DispatchStatus};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Outcomes buffered per receiver before a slow one starts lagging.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Multi-consumer outcome channel. Clones share the same channel.
#[derive(Clone)]
pub struct OutcomeBus {
    sender: broadcast::Sender<DispatchOutcome>,
}

impl OutcomeBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every outcome published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchOutcome> {
        self.sender.subscribe()
    }

    /// Hand an outcome to the current subscribers. Dropped when there are none.
    pub fn publish(&self, outcome: DispatchOutcome) {
        let _ = self.sender.send(outcome);
    }
}

impl Default for OutcomeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for OutcomeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}

/// Counts kept by [`log_outcomes`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    pub scheduled: u64,
    pub skipped: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Outcomes lost because the logger fell behind.
    pub lagged: u64,
}

impl OutcomeTally {
    fn record(&mut self, status: DispatchStatus) {
        match status {
            DispatchStatus::Scheduled => self.scheduled += 1,
            DispatchStatus::Skipped => self.skipped += 1,
            DispatchStatus::Succeeded => self.succeeded += 1,
            DispatchStatus::Failed => self.failed += 1,
        }
    }
}

/// Log every outcome until the bus closes, then return the totals.
///
/// Terminal outcomes log at info (warn for failures); scheduling decisions
/// log at debug since `submit` already reports them.
pub async fn log_outcomes(mut receiver: broadcast::Receiver<DispatchOutcome>) -> OutcomeTally {
    let mut tally = OutcomeTally::default();

    loop {
        match receiver.recv().await {
            Ok(outcome) => {
                tally.record(outcome.status);
                log_outcome(&outcome);
            }
            Err(RecvError::Lagged(missed)) => {
                tally.lagged += missed;
                tracing::warn!(
                    target: "bdr::outcome",
                    missed,
                    "outcome log fell behind, outcomes dropped"
                );
            }
            Err(RecvError::Closed) => break,
        }
    }

    tracing::info!(
        target: "bdr::outcome",
        scheduled = tally.scheduled,
        skipped = tally.skipped,
        succeeded = tally.succeeded,
        failed = tally.failed,
        lagged = tally.lagged,
        "outcome log closed"
    );
    tally
}

fn log_outcome(outcome: &DispatchOutcome) {
    let workflow = outcome.workflow_label();
    match outcome.status {
        DispatchStatus::Scheduled | DispatchStatus::Skipped => tracing::debug!(
            target: "bdr::outcome",
            delivery_id = %outcome.delivery_id,
            object_id = %outcome.object_id,
            workflow,
            status = %outcome.status,
            "dispatch outcome"
        ),
        DispatchStatus::Succeeded => tracing::info!(
            target: "bdr::outcome",
            delivery_id = %outcome.delivery_id,
            object_id = %outcome.object_id,
            workflow,
            status = %outcome.status,
            "dispatch outcome"
        ),
        DispatchStatus::Failed => tracing::warn!(
            target: "bdr::outcome",
            delivery_id = %outcome.delivery_id,
            object_id = %outcome.object_id,
            workflow,
            status = %outcome.status,
            error = outcome.error_detail.as_deref().unwrap_or(""),
            "dispatch outcome"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdr_types::workflow::WorkflowId;
    use uuid::Uuid;

    #[tokio::test]
    async fn logger_counts_every_status_until_closed() {
        let bus = OutcomeBus::new(16);
        let logger = tokio::spawn(log_outcomes(bus.subscribe()));

        let delivery = Uuid::now_v7();
        bus.publish(DispatchOutcome::scheduled(delivery, "1", WorkflowId::enrich()));
        bus.publish(DispatchOutcome::skipped(delivery, "2"));
        bus.publish(DispatchOutcome::succeeded(delivery, "1", WorkflowId::enrich()));
        bus.publish(DispatchOutcome::failed(delivery, "3", WorkflowId::prep(), "deal 3 not found"));
        drop(bus);

        let tally = logger.await.unwrap();
        assert_eq!(
            tally,
            OutcomeTally {
                scheduled: 1,
                skipped: 1,
                succeeded: 1,
                failed: 1,
                lagged: 0,
            }
        );
    }

    #[tokio::test]
    async fn slow_logger_counts_dropped_outcomes() {
        let bus = OutcomeBus::new(2);
        let receiver = bus.subscribe();

        for id in ["1", "2", "3", "4", "5"] {
            bus.publish(DispatchOutcome::skipped(Uuid::nil(), id));
        }
        drop(bus);

        let tally = log_outcomes(receiver).await;
        assert_eq!(tally.lagged, 3);
        assert_eq!(tally.skipped, 2);
    }

    #[test]
    fn publishing_without_subscribers_is_dropped() {
        let bus = OutcomeBus::new(4);
        bus.publish(DispatchOutcome::skipped(Uuid::nil(), "1"));

        let mut late = bus.subscribe();
        assert!(late.try_recv().is_err());
    }
}
