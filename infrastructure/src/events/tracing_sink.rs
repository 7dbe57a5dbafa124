//! Log each execution transition through `tracing`.

use relay_application::ports::execution_events::ExecutionEventSink;
use relay_domain::{ExecutionEvent, ExecutionEventKind};
use tracing::{debug, info, warn};

/// Sink that writes one diagnostic line per transition.
///
/// Failures and timeouts log at `warn`, terminal successes at `info`, and the
/// rest at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl ExecutionEventSink for TracingEventSink {
    fn emit(&self, event: ExecutionEvent) {
        let id = event.execution_id.as_str();
        let details = event.details.as_deref().unwrap_or("");
        match event.kind {
            ExecutionEventKind::Failed | ExecutionEventKind::Timeout | ExecutionEventKind::Cancelled => {
                warn!(execution_id = id, kind = event.kind.as_str(), "Execution ended: {}", details)
            }
            ExecutionEventKind::Completed => {
                info!(execution_id = id, "Execution completed")
            }
            ExecutionEventKind::Registered | ExecutionEventKind::Executing => {
                debug!(execution_id = id, kind = event.kind.as_str(), "Execution {}", event.status.as_str())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_domain::{ExecutionId, ExecutionStatus};

    #[test]
    fn test_emit_every_kind() {
        // No subscriber installed; emitting must simply not panic
        let sink = TracingEventSink;
        for (kind, status) in [
            (ExecutionEventKind::Registered, ExecutionStatus::Pending),
            (ExecutionEventKind::Executing, ExecutionStatus::Executing),
            (ExecutionEventKind::Completed, ExecutionStatus::Completed),
            (ExecutionEventKind::Failed, ExecutionStatus::Failed),
            (ExecutionEventKind::Timeout, ExecutionStatus::Timeout),
            (ExecutionEventKind::Cancelled, ExecutionStatus::Failed),
        ] {
            sink.emit(ExecutionEvent::new(ExecutionId::new("exec-1"), kind, status).with_details("x"));
        }
    }
}
