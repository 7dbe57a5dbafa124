//! Registry of executions delegated to asynchronous actors.
//!
//! Each active execution owns a [`TimeoutHandle`]: a spawned timer that forces
//! the execution to `timeout` unless a terminal transition cancels it first.
//! Every terminal path goes through one removal from the active map; whichever
//! caller removes the entry wins, and the loser observes `None`.
//!
//! Lock order is history mutex, then active-map shard. Registration reserves
//! the id in the issued set before touching the map, so the two never nest the
//! other way. The issued set outlives the bounded history: an id is accepted
//! once per registry.

use crate::config::RegistryParams;
use crate::ports::execution_events::{ExecutionEventSink, NoEventSink};
use chrono::Utc;
use dashmap::{DashMap, DashSet};
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use relay_domain::execution::{ContentMatch, match_content};
use relay_domain::{
    CorrelationMethod, ExecutionEvent, ExecutionEventKind, ExecutionId,
    ExecutionRecord, ExecutionStatus,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Error text recorded for caller-initiated cancellation.
pub const CANCELLED_ERROR: &str = "cancelled";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Execution id already used: {0}")]
    DuplicateId(ExecutionId),

    #[error("Execution {0} is already terminal")]
    AlreadyTerminal(ExecutionId),

    #[error("No async runtime available to schedule the execution timeout")]
    NoRuntime,
}

/// Scheduled timeout with an idempotent cancel.
#[derive(Debug)]
pub struct TimeoutHandle {
    token: CancellationToken,
}

impl TimeoutHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug)]
struct ActiveExecution {
    record: ExecutionRecord,
    timer: TimeoutHandle,
}

/// A correlated execution and the strategy that found it.
#[derive(Debug, Clone, PartialEq)]
pub struct Correlation {
    pub record: ExecutionRecord,
    pub method: CorrelationMethod,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegistryStatistics {
    pub active: usize,
    pub completed: usize,
    pub failed: usize,
    pub timed_out: usize,
    /// Mean duration of completed executions
    pub average_duration_ms: Option<f64>,
}

/// Plain-data view of the registry, suitable for persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub active: Vec<ExecutionRecord>,
    pub history: Vec<ExecutionRecord>,
}

impl RegistrySnapshot {
    pub fn into_records(self) -> Vec<ExecutionRecord> {
        let mut records = self.history;
        records.extend(self.active);
        records
    }
}

struct RegistryInner {
    params: RegistryParams,
    active: DashMap<ExecutionId, ActiveExecution>,
    history: Mutex<VecDeque<ExecutionRecord>>,
    /// Every id ever accepted, including those trimmed from history
    issued: DashSet<ExecutionId>,
    events: Arc<dyn ExecutionEventSink>,
}

/// Process-wide execution registry. Cloning shares the same state.
#[derive(Clone)]
pub struct ExecutionRegistry {
    inner: Arc<RegistryInner>,
}

impl Default for ExecutionRegistry {
    fn default() -> Self {
        Self::new(RegistryParams::default())
    }
}

impl ExecutionRegistry {
    pub fn new(params: RegistryParams) -> Self {
        Self::with_event_sink(params, Arc::new(NoEventSink))
    }

    pub fn with_event_sink(params: RegistryParams, events: Arc<dyn ExecutionEventSink>) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                params,
                active: DashMap::new(),
                history: Mutex::new(VecDeque::new()),
                issued: DashSet::new(),
                events,
            }),
        }
    }

    pub fn params(&self) -> &RegistryParams {
        &self.inner.params
    }

    // ==================== Lifecycle ====================

    /// Track a new execution and schedule its timeout.
    pub fn register_execution(&self, record: ExecutionRecord) -> Result<ExecutionId, RegistryError> {
        let timeout = self.inner.params.execution_timeout;
        self.register_execution_with_timeout(record, timeout)
    }

    pub fn register_execution_with_timeout(
        &self,
        record: ExecutionRecord,
        timeout: Duration,
    ) -> Result<ExecutionId, RegistryError> {
        if record.is_terminal() {
            return Err(RegistryError::AlreadyTerminal(record.id));
        }
        let id = record.id.clone();
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| RegistryError::NoRuntime)?;
        if !self.inner.issued.insert(id.clone()) {
            return Err(RegistryError::DuplicateId(id));
        }

        let status = record.status;
        match self.inner.active.entry(id.clone()) {
            Entry::Occupied(_) => return Err(RegistryError::DuplicateId(id)),
            Entry::Vacant(slot) => {
                let token = CancellationToken::new();
                slot.insert(ActiveExecution {
                    record,
                    timer: TimeoutHandle {
                        token: token.clone(),
                    },
                });
                spawn_timeout(&runtime, Arc::downgrade(&self.inner), id.clone(), timeout, token);
            }
        }

        info!(execution_id = %id, timeout_secs = timeout.as_secs(), "Registered execution");
        self.inner
            .emit(ExecutionEvent::new(id.clone(), ExecutionEventKind::Registered, status));
        Ok(id)
    }

    /// `pending -> executing`. Returns `None` if the id is not active.
    pub fn mark_executing(&self, id: &ExecutionId) -> Option<ExecutionRecord> {
        let updated = {
            let mut entry = self.inner.active.get_mut(id)?;
            if let Err(e) = entry.record.transition(ExecutionStatus::Executing) {
                warn!(execution_id = %id, "Ignoring transition: {}", e);
                return None;
            }
            entry.record.clone()
        };
        self.inner.emit(ExecutionEvent::new(
            id.clone(),
            ExecutionEventKind::Executing,
            ExecutionStatus::Executing,
        ));
        Some(updated)
    }

    pub fn complete_execution(&self, id: &ExecutionId) -> Option<ExecutionRecord> {
        self.inner
            .finish(id, ExecutionStatus::Completed, None, ExecutionEventKind::Completed)
    }

    pub fn fail_execution(&self, id: &ExecutionId, error: Option<String>) -> Option<ExecutionRecord> {
        self.inner
            .finish(id, ExecutionStatus::Failed, error, ExecutionEventKind::Failed)
    }

    /// Stop tracking an execution at the caller's request.
    ///
    /// The record ends as `failed` with error [`CANCELLED_ERROR`]; the emitted
    /// event kind is `cancelled`.
    pub fn cancel_execution(&self, id: &ExecutionId) -> Option<ExecutionRecord> {
        self.inner.finish(
            id,
            ExecutionStatus::Failed,
            Some(CANCELLED_ERROR.to_string()),
            ExecutionEventKind::Cancelled,
        )
    }

    // ==================== Correlation ====================

    pub fn correlate_by_execution_id(&self, id: &ExecutionId) -> Option<ExecutionRecord> {
        self.inner.active.get(id).map(|entry| entry.record.clone())
    }

    /// Best content match among active executions; ties go to the most recent.
    pub fn correlate_by_content(&self, task_description: &str) -> Option<(ExecutionRecord, ContentMatch)> {
        let threshold = self.inner.params.overlap_threshold;
        let mut best: Option<(ExecutionRecord, ContentMatch)> = None;
        for entry in self.inner.active.iter() {
            let Some(found) = match_content(task_description, &entry.record.task_description, threshold)
            else {
                continue;
            };
            let better = match &best {
                None => true,
                Some((current, current_match)) => {
                    found.score() > current_match.score()
                        || (found.score() == current_match.score()
                            && entry.record.start_time > current.start_time)
                }
            };
            if better {
                best = Some((entry.record.clone(), found));
            }
        }
        best
    }

    /// The only active execution, else the most recently started one.
    pub fn correlate_by_time(&self) -> Option<ExecutionRecord> {
        self.inner
            .active
            .iter()
            .max_by_key(|entry| entry.record.start_time)
            .map(|entry| entry.record.clone())
    }

    /// Exact id, then content, then timing. First hit wins.
    pub fn smart_correlate(
        &self,
        execution_id: Option<&str>,
        task_description: Option<&str>,
    ) -> Option<Correlation> {
        if let Some(id) = execution_id
            && let Some(record) = self.correlate_by_execution_id(&ExecutionId::new(id))
        {
            return Some(Correlation {
                record,
                method: CorrelationMethod::ExecutionId,
            });
        }

        if let Some(description) = task_description
            && let Some((record, found)) = self.correlate_by_content(description)
        {
            return Some(Correlation {
                record,
                method: found.method(),
            });
        }

        let correlated = self.correlate_by_time().map(|record| Correlation {
            record,
            method: CorrelationMethod::Temporal,
        });
        if correlated.is_none() {
            debug!(?execution_id, ?task_description, "No active execution to correlate");
        }
        correlated
    }

    // ==================== Inspection ====================

    /// Active record, else the retained terminal one.
    pub fn get(&self, id: &ExecutionId) -> Option<ExecutionRecord> {
        self.correlate_by_execution_id(id).or_else(|| {
            self.inner
                .history
                .lock()
                .iter()
                .rev()
                .find(|r| &r.id == id)
                .cloned()
        })
    }

    pub fn active_count(&self) -> usize {
        self.inner.active.len()
    }

    pub fn active_executions(&self) -> Vec<ExecutionRecord> {
        let mut records: Vec<_> = self
            .inner
            .active
            .iter()
            .map(|entry| entry.record.clone())
            .collect();
        records.sort_by_key(|r| r.start_time);
        records
    }

    pub fn history(&self) -> Vec<ExecutionRecord> {
        self.inner.history.lock().iter().cloned().collect()
    }

    pub fn get_statistics(&self) -> RegistryStatistics {
        let history = self.inner.history.lock();
        let mut stats = RegistryStatistics {
            active: self.inner.active.len(),
            ..Default::default()
        };
        let mut total_ms = 0u64;
        for record in history.iter() {
            match record.status {
                ExecutionStatus::Completed => {
                    stats.completed += 1;
                    total_ms += record.duration_ms.unwrap_or(0);
                }
                ExecutionStatus::Failed => stats.failed += 1,
                ExecutionStatus::Timeout => stats.timed_out += 1,
                _ => {}
            }
        }
        if stats.completed > 0 {
            stats.average_duration_ms = Some(total_ms as f64 / stats.completed as f64);
        }
        stats
    }

    // ==================== Persistence ====================

    pub fn snapshot(&self) -> RegistrySnapshot {
        let history = self.inner.history.lock();
        let mut active: Vec<_> = self
            .inner
            .active
            .iter()
            .map(|entry| entry.record.clone())
            .collect();
        active.sort_by_key(|r| r.start_time);
        RegistrySnapshot {
            active,
            history: history.iter().cloned().collect(),
        }
    }

    /// Load persisted records.
    ///
    /// Terminal records go to history; the rest are re-registered with a fresh
    /// timer. Ids this registry has already issued are skipped, even when
    /// their records were trimmed from history. Returns how many were loaded.
    pub fn restore(&self, records: Vec<ExecutionRecord>) -> Result<usize, RegistryError> {
        let mut restored = 0;
        for record in records {
            if record.is_terminal() {
                if !self.inner.issued.insert(record.id.clone()) {
                    debug!(execution_id = %record.id, "Skipping already-known execution");
                    continue;
                }
                let mut history = self.inner.history.lock();
                history.push_back(record);
                self.inner.trim_history(&mut history);
                restored += 1;
            } else {
                match self.register_execution(record) {
                    Ok(_) => restored += 1,
                    Err(RegistryError::DuplicateId(id)) => {
                        debug!(execution_id = %id, "Skipping already-known execution");
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        info!(restored, "Restored execution records");
        Ok(restored)
    }

    /// Cancel every active execution. Returns the cancelled records.
    pub fn shutdown(&self) -> Vec<ExecutionRecord> {
        let ids: Vec<ExecutionId> = self
            .inner
            .active
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        ids.iter()
            .filter_map(|id| self.cancel_execution(id))
            .collect()
    }
}

impl RegistryInner {
    fn emit(&self, event: ExecutionEvent) {
        self.events.emit(event);
    }

    fn finish(
        &self,
        id: &ExecutionId,
        status: ExecutionStatus,
        error: Option<String>,
        kind: ExecutionEventKind,
    ) -> Option<ExecutionRecord> {
        let mut history = self.history.lock();
        let (_, active) = self.active.remove(id)?;
        active.timer.cancel();

        let mut record = active.record;
        if let Err(e) = record.finish(status, error.clone(), Utc::now()) {
            warn!(execution_id = %id, "Forcing terminal status: {}", e);
            record.status = status;
            record.error = error;
        }
        history.push_back(record.clone());
        self.trim_history(&mut history);
        drop(history);

        info!(
            execution_id = %id,
            status = %record.status,
            duration_ms = record.duration_ms.unwrap_or(0),
            "Execution finished"
        );
        let mut event = ExecutionEvent::new(id.clone(), kind, record.status);
        if let Some(error) = &record.error {
            event = event.with_details(error.clone());
        }
        self.emit(event);
        Some(record)
    }

    fn trim_history(&self, history: &mut VecDeque<ExecutionRecord>) {
        while history.len() > self.params.history_capacity {
            history.pop_front();
        }
    }
}

fn spawn_timeout(
    runtime: &tokio::runtime::Handle,
    registry: Weak<RegistryInner>,
    id: ExecutionId,
    timeout: Duration,
    token: CancellationToken,
) {
    runtime.spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(timeout) => {
                if let Some(inner) = registry.upgrade() {
                    let message = format!("timed out after {}s", timeout.as_secs());
                    if inner
                        .finish(&id, ExecutionStatus::Timeout, Some(message), ExecutionEventKind::Timeout)
                        .is_some()
                    {
                        warn!(execution_id = %id, "Execution timed out");
                    }
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    /// Event sink that records every event for assertions
    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<ExecutionEvent>>,
    }

    impl RecordingSink {
        fn kinds(&self) -> Vec<ExecutionEventKind> {
            self.events.lock().iter().map(|e| e.kind).collect()
        }
    }

    impl ExecutionEventSink for RecordingSink {
        fn emit(&self, event: ExecutionEvent) {
            self.events.lock().push(event);
        }
    }

    fn record(id: &str, task: &str) -> ExecutionRecord {
        ExecutionRecord::new(id, "agent", "invoke", task)
    }

    #[tokio::test]
    async fn test_register_then_complete() {
        let sink = Arc::new(RecordingSink::default());
        let registry = ExecutionRegistry::with_event_sink(RegistryParams::default(), sink.clone());

        let id = registry
            .register_execution(record("abc-1", "review the diff"))
            .unwrap();
        registry.mark_executing(&id).unwrap();
        let done = registry.complete_execution(&id).unwrap();

        assert_eq!(done.status, ExecutionStatus::Completed);
        assert!(done.duration_ms.is_some());
        assert_eq!(registry.active_count(), 0);
        assert_eq!(registry.history().len(), 1);
        assert_eq!(
            sink.kinds(),
            vec![
                ExecutionEventKind::Registered,
                ExecutionEventKind::Executing,
                ExecutionEventKind::Completed
            ]
        );
    }

    #[tokio::test]
    async fn test_double_completion_is_noop() {
        let registry = ExecutionRegistry::default();
        let id = registry.register_execution(record("abc-1", "t")).unwrap();
        assert!(registry.complete_execution(&id).is_some());
        assert!(registry.complete_execution(&id).is_none());
        assert!(registry.fail_execution(&id, None).is_none());
        assert!(registry.cancel_execution(&ExecutionId::new("missing")).is_none());
        assert_eq!(registry.history().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_ids_rejected() {
        let registry = ExecutionRegistry::default();
        registry.register_execution(record("abc-1", "t")).unwrap();
        assert_eq!(
            registry.register_execution(record("abc-1", "t")),
            Err(RegistryError::DuplicateId(ExecutionId::new("abc-1")))
        );

        registry.complete_execution(&ExecutionId::new("abc-1"));
        assert!(matches!(
            registry.register_execution(record("abc-1", "t")),
            Err(RegistryError::DuplicateId(_))
        ));
    }

    #[tokio::test]
    async fn test_id_not_reusable_after_history_eviction() {
        let registry = ExecutionRegistry::new(RegistryParams::default().with_history_capacity(1));
        for id in ["abc-1", "abc-2"] {
            let id = registry.register_execution(record(id, "t")).unwrap();
            registry.complete_execution(&id).unwrap();
        }
        // abc-1 is no longer retained
        assert!(registry.history().iter().all(|r| r.id.as_str() != "abc-1"));

        assert_eq!(
            registry.register_execution(record("abc-1", "t")),
            Err(RegistryError::DuplicateId(ExecutionId::new("abc-1")))
        );
        assert_eq!(registry.active_count(), 0);

        let mut evicted = record("abc-1", "t");
        evicted.finish(ExecutionStatus::Completed, None, Utc::now()).unwrap();
        assert_eq!(registry.restore(vec![evicted, record("abc-1", "t")]).unwrap(), 0);
        assert_eq!(registry.history().len(), 1);
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_register_without_runtime_fails() {
        let registry = ExecutionRegistry::default();
        assert_eq!(
            registry.register_execution(record("abc-1", "t")),
            Err(RegistryError::NoRuntime)
        );
        assert_eq!(registry.active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_moves_to_history() {
        let sink = Arc::new(RecordingSink::default());
        let registry = ExecutionRegistry::with_event_sink(
            RegistryParams::default().with_execution_timeout(Duration::from_secs(60)),
            sink.clone(),
        );
        let id = registry.register_execution(record("abc-1", "t")).unwrap();

        tokio::time::sleep(Duration::from_secs(61)).await;

        assert_eq!(registry.active_count(), 0);
        let history = registry.history();
        assert_eq!(history[0].status, ExecutionStatus::Timeout);
        assert!(registry.complete_execution(&id).is_none());
        assert_eq!(sink.kinds().last(), Some(&ExecutionEventKind::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_cancels_timer() {
        let registry = ExecutionRegistry::new(
            RegistryParams::default().with_execution_timeout(Duration::from_secs(5)),
        );
        let id = registry.register_execution(record("abc-1", "t")).unwrap();
        registry.complete_execution(&id).unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;
        let history = registry.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, ExecutionStatus::Completed);
    }

    #[tokio::test]
    async fn test_cancel_records_failure() {
        let sink = Arc::new(RecordingSink::default());
        let registry = ExecutionRegistry::with_event_sink(RegistryParams::default(), sink.clone());
        let id = registry.register_execution(record("abc-1", "t")).unwrap();
        let cancelled = registry.cancel_execution(&id).unwrap();
        assert_eq!(cancelled.status, ExecutionStatus::Failed);
        assert_eq!(cancelled.error.as_deref(), Some(CANCELLED_ERROR));
        assert_eq!(sink.kinds().last(), Some(&ExecutionEventKind::Cancelled));
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let registry = ExecutionRegistry::new(RegistryParams::default().with_history_capacity(2));
        for i in 0..4 {
            let id = registry
                .register_execution(record(&format!("exec-{i}"), "t"))
                .unwrap();
            registry.complete_execution(&id);
        }
        let ids: Vec<_> = registry.history().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![ExecutionId::new("exec-2"), ExecutionId::new("exec-3")]);
    }

    #[tokio::test]
    async fn test_smart_correlate_prefers_content_over_time() {
        let registry = ExecutionRegistry::default();
        let now = Utc::now();
        registry
            .register_execution(
                record("a", "Refactor the parser module").with_start_time(now - ChronoDuration::seconds(10)),
            )
            .unwrap();
        registry
            .register_execution(record("b", "Write release notes").with_start_time(now))
            .unwrap();

        let found = registry
            .smart_correlate(None, Some("refactor the parser module!"))
            .unwrap();
        assert_eq!(found.record.id, ExecutionId::new("a"));
        assert_eq!(found.method, CorrelationMethod::ContentExact);

        let similar = registry
            .smart_correlate(None, Some("parser refactor is finished"))
            .unwrap();
        assert_eq!(similar.record.id, ExecutionId::new("a"));
        assert_eq!(similar.method, CorrelationMethod::ContentSimilarity);
    }

    #[tokio::test]
    async fn test_smart_correlate_by_id_first() {
        let registry = ExecutionRegistry::default();
        registry.register_execution(record("a", "alpha task")).unwrap();
        registry.register_execution(record("b", "beta task")).unwrap();

        let found = registry.smart_correlate(Some("a"), Some("beta task")).unwrap();
        assert_eq!(found.record.id, ExecutionId::new("a"));
        assert_eq!(found.method, CorrelationMethod::ExecutionId);
    }

    #[tokio::test]
    async fn test_smart_correlate_falls_back_to_time() {
        let registry = ExecutionRegistry::default();
        assert!(registry.smart_correlate(Some("missing-id"), None).is_none());

        let now = Utc::now();
        registry
            .register_execution(record("old", "x").with_start_time(now - ChronoDuration::seconds(5)))
            .unwrap();
        registry
            .register_execution(record("new", "y").with_start_time(now))
            .unwrap();

        let found = registry.smart_correlate(Some("missing-id"), None).unwrap();
        assert_eq!(found.record.id, ExecutionId::new("new"));
        assert_eq!(found.method, CorrelationMethod::Temporal);
    }

    #[tokio::test]
    async fn test_statistics() {
        let registry = ExecutionRegistry::default();
        let start = Utc::now() - ChronoDuration::milliseconds(100);
        let a = registry
            .register_execution(record("a", "t").with_start_time(start))
            .unwrap();
        let b = registry.register_execution(record("b", "t")).unwrap();
        registry.register_execution(record("c", "t")).unwrap();
        registry.complete_execution(&a);
        registry.fail_execution(&b, Some("boom".into()));

        let stats = registry.get_statistics();
        assert_eq!(stats.active, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.timed_out, 0);
        assert!(stats.average_duration_ms.unwrap() >= 100.0);
    }

    #[tokio::test]
    async fn test_snapshot_restore_roundtrip() {
        let registry = ExecutionRegistry::default();
        let done = registry.register_execution(record("done", "t")).unwrap();
        registry.complete_execution(&done);
        registry.register_execution(record("open", "t")).unwrap();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.active.len(), 1);
        assert_eq!(snapshot.history.len(), 1);

        let json = serde_json::to_string(&snapshot).unwrap();
        let loaded: RegistrySnapshot = serde_json::from_str(&json).unwrap();

        let fresh = ExecutionRegistry::default();
        assert_eq!(fresh.restore(loaded.clone().into_records()).unwrap(), 2);
        assert_eq!(fresh.active_count(), 1);
        assert_eq!(fresh.history().len(), 1);
        // Restoring again skips known ids
        assert_eq!(fresh.restore(loaded.into_records()).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_all() {
        let registry = ExecutionRegistry::default();
        registry.register_execution(record("a", "t")).unwrap();
        registry.register_execution(record("b", "t")).unwrap();

        let cancelled = registry.shutdown();
        assert_eq!(cancelled.len(), 2);
        assert_eq!(registry.active_count(), 0);
        assert!(registry.history().iter().all(|r| r.status == ExecutionStatus::Failed));
    }

    #[tokio::test]
    async fn test_concurrent_terminal_transitions_single_winner() {
        let registry = ExecutionRegistry::default();
        let id = registry.register_execution(record("race", "t")).unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let registry = registry.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    registry.complete_execution(&id).is_some()
                } else {
                    registry.fail_execution(&id, None).is_some()
                }
            }));
        }
        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(registry.history().len(), 1);
        assert_eq!(registry.active_count(), 0);
    }
}
