//! Dispatcher: routes a batch of events and fires one isolated execution unit
//! per matched event.
//!
//! `submit` is synchronous and never waits on a workflow. Each matched event
//! is moved into its own tokio task (tracked by a `TaskTracker` so shutdown
//! can drain in-flight work). Inside the unit, the handler runs on a nested
//! task so that a panic surfaces as a `JoinError` instead of unwinding
//! through the unit; an optional timeout aborts the nested task. Every
//! failure becomes a `failed` outcome that is published and handed to the
//! failure sink, never returned to the caller.

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::task::TaskTracker;
use tracing::Instrument;
use uuid::Uuid;

use bdr_types::error::{DispatchError, ExecutionError, ExecutionFault};
use bdr_types::event::NormalizedEvent;
use bdr_types::outcome::{DispatchOutcome, DispatchStatus};
use bdr_types::workflow::WorkflowId;

use crate::routing::Router;
use crate::workflow::{BoxWorkflowHandler, WorkflowRegistry};

use super::bus::OutcomeBus;
use super::sink::BoxFailureSink;

// ---------------------------------------------------------------------------
// Acknowledgment
// ---------------------------------------------------------------------------

/// What `submit` returns: the synchronous part of each event's outcome.
#[derive(Debug, Clone)]
pub struct Acknowledgment {
    pub delivery_id: Uuid,
    /// One `scheduled` or `skipped` outcome per event, in scheduling order.
    pub outcomes: Vec<DispatchOutcome>,
}

impl Acknowledgment {
    pub fn scheduled(&self) -> usize {
        self.count(DispatchStatus::Scheduled)
    }

    pub fn skipped(&self) -> usize {
        self.count(DispatchStatus::Skipped)
    }

    fn count(&self, status: DispatchStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Routes events and schedules workflow execution.
pub struct Dispatcher {
    router: Router,
    registry: Arc<WorkflowRegistry>,
    sink: Arc<BoxFailureSink>,
    outcomes: OutcomeBus,
    execution_timeout: Option<Duration>,
    tracker: TaskTracker,
}

impl Dispatcher {
    /// Create a dispatcher.
    ///
    /// Fails if any rule targets a workflow that has no registered handler,
    /// so a matched event can always be scheduled.
    pub fn new(
        router: Router,
        registry: Arc<WorkflowRegistry>,
        sink: BoxFailureSink,
    ) -> Result<Self, DispatchError> {
        if let Some(missing) = router
            .rules()
            .workflows()
            .into_iter()
            .find(|id| !registry.contains(id))
        {
            return Err(DispatchError::UnregisteredWorkflow(missing.clone()));
        }

        Ok(Self {
            router,
            registry,
            sink: Arc::new(sink),
            outcomes: OutcomeBus::default(),
            execution_timeout: None,
            tracker: TaskTracker::new(),
        })
    }

    /// Limit each execution unit. Expiry counts as a failure.
    pub fn with_execution_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.execution_timeout = timeout;
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn outcomes(&self) -> &OutcomeBus {
        &self.outcomes
    }

    /// Execution units that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Route every event and schedule the matched ones. Returns immediately.
    ///
    /// Events are scheduled in `occurred_at` order; execution order is not
    /// guaranteed. Must be called from within a tokio runtime. After
    /// [`shutdown`](Self::shutdown) matched events are recorded as `failed`
    /// instead of being started.
    pub fn submit(&self, mut events: Vec<NormalizedEvent>) -> Acknowledgment {
        let delivery_id = Uuid::now_v7();
        events.sort_by_key(NormalizedEvent::occurred_at);

        let mut outcomes = Vec::with_capacity(events.len());
        for event in events {
            let outcome = match self.router.resolve(&event) {
                Some(workflow) if self.tracker.is_closed() => {
                    tracing::warn!(
                        %delivery_id,
                        object_id = event.object_id(),
                        workflow = %workflow,
                        "dispatcher is shut down, workflow not started"
                    );
                    DispatchOutcome::failed(
                        delivery_id,
                        event.object_id(),
                        workflow,
                        "dispatcher is shut down",
                    )
                }
                Some(workflow) => self.schedule(delivery_id, workflow, event),
                None => {
                    tracing::info!(
                        %delivery_id,
                        object_id = event.object_id(),
                        subscription_type = %event.subscription_type(),
                        property = event.changed_property().unwrap_or(""),
                        "no workflow matched, skipping"
                    );
                    DispatchOutcome::skipped(delivery_id, event.object_id())
                }
            };
            self.outcomes.publish(outcome.clone());
            outcomes.push(outcome);
        }

        tracing::debug!(
            %delivery_id,
            events = outcomes.len(),
            in_flight = self.tracker.len(),
            "delivery submitted"
        );

        Acknowledgment {
            delivery_id,
            outcomes,
        }
    }

    /// Stop starting workflows and wait up to `grace` for in-flight units.
    /// Returns `true` if everything finished in time.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.tracker.close();
        let pending = self.tracker.len();
        if pending > 0 {
            tracing::info!(pending, "waiting for in-flight workflows");
        }

        match tokio::time::timeout(grace, self.tracker.wait()).await {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(
                    pending = self.tracker.len(),
                    grace_secs = grace.as_secs(),
                    "shutdown grace period elapsed with workflows still running"
                );
                false
            }
        }
    }

    fn schedule(
        &self,
        delivery_id: Uuid,
        workflow: WorkflowId,
        event: NormalizedEvent,
    ) -> DispatchOutcome {
        let object_id = event.object_id().to_string();

        let Some(handler) = self.registry.get(&workflow) else {
            // Unreachable after `new` validated the table; still reported
            // rather than dropped.
            let outcome = DispatchOutcome::failed(
                delivery_id,
                &object_id,
                workflow,
                "no handler registered",
            );
            let sink = Arc::clone(&self.sink);
            let report = outcome.clone();
            self.tracker.spawn(async move { sink.report(&report).await });
            return outcome;
        };

        tracing::info!(
            %delivery_id,
            object_id = %object_id,
            workflow = %workflow,
            "scheduling workflow"
        );

        let span = tracing::info_span!(
            "workflow_unit",
            %delivery_id,
            workflow = %workflow,
            object_id = %object_id,
        );

        let unit = ExecutionUnit {
            delivery_id,
            workflow: workflow.clone(),
            handler,
            event,
            timeout: self.execution_timeout,
            sink: Arc::clone(&self.sink),
            outcomes: self.outcomes.clone(),
        };
        self.tracker.spawn(unit.run().instrument(span));

        DispatchOutcome::scheduled(delivery_id, object_id, workflow)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("rules", &self.router.rules().len())
            .field("workflows", &self.registry.len())
            .field("sink", &self.sink.name())
            .field("execution_timeout", &self.execution_timeout)
            .field("in_flight", &self.tracker.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Execution unit
// ---------------------------------------------------------------------------

/// Everything one background workflow run owns.
struct ExecutionUnit {
    delivery_id: Uuid,
    workflow: WorkflowId,
    handler: Arc<BoxWorkflowHandler>,
    event: NormalizedEvent,
    timeout: Option<Duration>,
    sink: Arc<BoxFailureSink>,
    outcomes: OutcomeBus,
}

impl ExecutionUnit {
    async fn run(self) {
        let object_id = self.event.object_id().to_string();
        let started = Instant::now();

        let result = execute(self.handler, self.event, self.timeout).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(()) => {
                tracing::info!(elapsed_ms, "workflow completed");
                self.outcomes.publish(DispatchOutcome::succeeded(
                    self.delivery_id,
                    object_id,
                    self.workflow,
                ));
            }
            Err(e) => {
                tracing::warn!(elapsed_ms, error = %e, "workflow failed");
                let outcome =
                    DispatchOutcome::failed(self.delivery_id, object_id, self.workflow, e.to_string());
                self.outcomes.publish(outcome.clone());
                self.sink.report(&outcome).await;
            }
        }
    }
}

/// Run the handler on its own task and fold every way it can go wrong into
/// an `ExecutionError`.
async fn execute(
    handler: Arc<BoxWorkflowHandler>,
    event: NormalizedEvent,
    timeout: Option<Duration>,
) -> Result<(), ExecutionError> {
    let task = tokio::spawn(async move { handler.run(event).await }.in_current_span());
    let abort = task.abort_handle();

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined,
            Err(_) => {
                abort.abort();
                return Err(ExecutionFault::TimedOut(limit).into());
            }
        },
        None => task.await,
    };

    match joined {
        Ok(result) => result.map_err(ExecutionError::from),
        Err(e) if e.is_panic() => Err(ExecutionFault::Panicked(panic_message(e.into_panic())).into()),
        Err(_) => Err(ExecutionFault::Cancelled.into()),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
