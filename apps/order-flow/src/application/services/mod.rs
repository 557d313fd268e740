//! Application Services
//!
//! Long-lived components shared by the send loop and the inbound event
//! stream: the logon gate, cancel coordination, event dispatch and counters.

mod cancellation;
mod dispatcher;
mod inbound_event;
mod ready_gate;
mod run_context;
mod run_counters;

pub use cancellation::{
    CancelRetryPolicy, CancellationCoordinator, CancellationError, RetryDecision,
};
pub use dispatcher::{DispatchOutcome, SessionEventDispatcher};
pub use inbound_event::{FillReport, InboundEvent};
pub use ready_gate::ReadyGate;
pub use run_context::RunContext;
pub use run_counters::{CounterSnapshot, RunCounters};
