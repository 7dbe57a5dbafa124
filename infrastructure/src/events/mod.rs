//! Execution event sinks.
//!
//! Adapters for the [`ExecutionEventSink`](relay_application::ExecutionEventSink)
//! port: [`TracingEventSink`] turns transitions into diagnostics, and
//! [`BroadcastEventSink`] fans them out to any number of subscribers.

mod broadcast_sink;
mod tracing_sink;

pub use broadcast_sink::BroadcastEventSink;
pub use tracing_sink::TracingEventSink;
