//! Event intake, routing and dispatch for the BDR assistant.
//!
//! This crate owns the pipeline between a parsed HubSpot delivery and a
//! running workflow. It defines the ports (`WorkflowHandler`, `FailureSink`)
//! that `bdr-infra` implements and never depends on an HTTP client or a
//! vendor SDK.

pub mod dispatch;
pub mod event;
pub mod routing;
pub mod workflow;
