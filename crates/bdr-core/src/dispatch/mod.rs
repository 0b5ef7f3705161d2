//! Asynchronous dispatch of routed events.
//!
//! - `dispatcher` -- `Dispatcher::submit` and the per-event execution unit
//! - `bus` -- broadcast channel carrying every `DispatchOutcome`, and its logger
//! - `sink` -- `FailureSink` trait for reporting failed outcomes

pub mod bus;
pub mod dispatcher;
pub mod sink;

pub use bus::{OutcomeBus, OutcomeTally, log_outcomes};
pub use dispatcher::{Acknowledgment, Dispatcher};
pub use sink::{BoxFailureSink, FailureSink, LogFailureSink};
