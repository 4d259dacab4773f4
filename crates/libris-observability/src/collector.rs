//! Concurrent trace collector with bounded buffers
//!
//! One collector instance is shared by every in-flight request. Open traces
//! are keyed by [`TraceId`], so any number of requests can record
//! concurrently. All state lives behind a single mutex; callers must never
//! hold collector results across a model call.

use crate::trace::{
    Component, ComponentTiming, ErrorKind, ErrorRecord, RequestTrace, ResourceDelta,
    ResourceSnapshot, ToolInvocationRecord, TraceStatus,
};
use crate::ResourceSampler;
use chrono::Utc;
use libris_core::{SessionId, TraceId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Buffer bounds for the collector.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Completed traces retained.
    pub max_traces: usize,
    /// Invocation records retained per tool.
    pub max_per_tool: usize,
    /// Error records retained.
    pub max_errors: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_traces: 100,
            max_per_tool: 50,
            max_errors: 50,
        }
    }
}

/// Persistence failures for the metrics buffers.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Metrics I/O failed: {details}")]
    Io { details: String },

    #[error("Metrics serialization failed: {details}")]
    Serialization { details: String },
}

/// Aggregate statistics over the completed-trace buffer.
///
/// Latencies are in seconds. An empty buffer yields the all-zero default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub error_rate: f64,
    pub total_errors: usize,
    pub avg_latency: f64,
    pub min_latency: f64,
    pub max_latency: f64,
    pub p50_latency: f64,
    pub p95_latency: f64,
    pub p99_latency: f64,
    pub total_tools_used: usize,
    pub unique_tools: usize,
    pub tool_usage: HashMap<String, usize>,
    pub most_used_tool: Option<String>,
    pub avg_cpu_percent: f64,
    pub avg_memory_delta_mb: f64,
}

/// Timing aggregates for one pipeline component across the completed
/// traces. Latencies are in seconds; no samples yields the all-zero
/// default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentStats {
    pub count: usize,
    pub avg_latency: f64,
    pub min_latency: f64,
    pub max_latency: f64,
    pub p50_latency: f64,
    pub p95_latency: f64,
}

/// The serialized form of the bounded buffers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedBuffers {
    completed: Vec<RequestTrace>,
    per_tool: HashMap<String, Vec<ToolInvocationRecord>>,
    errors: Vec<ErrorRecord>,
}

struct OpenTrace {
    trace: RequestTrace,
    started: Instant,
    resources_start: ResourceSnapshot,
}

struct CollectorState {
    sampler: ResourceSampler,
    open: HashMap<TraceId, OpenTrace>,
    completed: VecDeque<RequestTrace>,
    per_tool: HashMap<String, VecDeque<ToolInvocationRecord>>,
    errors: VecDeque<ErrorRecord>,
}

/// Shared metrics and trace collector.
pub struct TraceCollector {
    config: CollectorConfig,
    state: Mutex<CollectorState>,
}

impl TraceCollector {
    pub fn new(config: CollectorConfig) -> Self {
        Self {
            config,
            state: Mutex::new(CollectorState {
                sampler: ResourceSampler::new(),
                open: HashMap::new(),
                completed: VecDeque::new(),
                per_tool: HashMap::new(),
                errors: VecDeque::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CollectorState> {
        // Collector state is append-only records; a panicked writer cannot
        // leave it half-updated in a way later readers would misinterpret.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Open an in-flight trace. Reusing an id that is already open is a
    /// caller error; the first trace wins and the duplicate is dropped with
    /// a warning.
    pub fn start_request(&self, trace_id: TraceId, query: &str, session_id: SessionId) {
        let mut state = self.lock();
        if state.open.contains_key(&trace_id) {
            tracing::warn!(trace = %trace_id, "Duplicate trace id; keeping the first");
            return;
        }
        let resources_start = state.sampler.sample();
        state.open.insert(
            trace_id.clone(),
            OpenTrace {
                trace: RequestTrace {
                    trace_id,
                    session_id,
                    query: query.to_string(),
                    answer: String::new(),
                    status: TraceStatus::Success,
                    started_at: Utc::now(),
                    total_latency: Duration::ZERO,
                    components: Vec::new(),
                    tools_used: Vec::new(),
                    resource_usage: ResourceDelta::default(),
                },
                started: Instant::now(),
                resources_start,
            },
        );
    }

    /// Attribute time to a pipeline component within an open trace.
    pub fn record_component(&self, trace_id: &TraceId, component: Component, duration: Duration) {
        let mut state = self.lock();
        if let Some(open) = state.open.get_mut(trace_id) {
            open.trace.components.push(ComponentTiming {
                component,
                duration,
            });
        } else {
            tracing::warn!(trace = %trace_id, component = %component, "Timing for unknown trace dropped");
        }
    }

    /// Record a tool invocation against an open trace and the per-tool
    /// series.
    pub fn record_tool(&self, trace_id: &TraceId, record: ToolInvocationRecord) {
        let max_per_tool = self.config.max_per_tool;
        let mut state = self.lock();

        let series = state
            .per_tool
            .entry(record.tool_name.clone())
            .or_default();
        series.push_back(record.clone());
        while series.len() > max_per_tool {
            series.pop_front();
        }

        if let Some(open) = state.open.get_mut(trace_id) {
            open.trace.tools_used.push(record);
        } else {
            tracing::warn!(trace = %trace_id, tool = %record.tool_name, "Tool record for unknown trace");
        }
    }

    /// Record an error, both globally and against the open trace's status.
    pub fn record_error(
        &self,
        trace_id: &TraceId,
        kind: ErrorKind,
        message: &str,
        component: Component,
    ) {
        let max_errors = self.config.max_errors;
        let mut state = self.lock();
        state.errors.push_back(ErrorRecord {
            kind,
            message: message.to_string(),
            component,
            timestamp: Utc::now(),
        });
        while state.errors.len() > max_errors {
            state.errors.pop_front();
        }
        tracing::debug!(trace = %trace_id, kind = %kind, component = %component, "Recorded error");
    }

    /// Finalize an open trace: freeze latency and resource usage and move
    /// it into the bounded buffer. Ending an unknown or already-ended trace
    /// is a no-op with a warning.
    pub fn end_request(&self, trace_id: &TraceId, answer: &str, status: TraceStatus) {
        let max_traces = self.config.max_traces;
        let mut state = self.lock();
        let Some(mut open) = state.open.remove(trace_id) else {
            tracing::warn!(trace = %trace_id, "end_request for unknown trace");
            return;
        };

        let resources_end = state.sampler.sample();
        open.trace.answer = answer.to_string();
        open.trace.status = status;
        open.trace.total_latency = open.started.elapsed();
        open.trace.resource_usage = ResourceDelta::between(open.resources_start, resources_end);

        state.completed.push_back(open.trace);
        while state.completed.len() > max_traces {
            state.completed.pop_front();
        }
    }

    /// Number of traces currently open.
    pub fn open_count(&self) -> usize {
        self.lock().open.len()
    }

    /// Clone of the completed-trace buffer, oldest first.
    pub fn completed_traces(&self) -> Vec<RequestTrace> {
        self.lock().completed.iter().cloned().collect()
    }

    /// The most recent invocation records for one tool, oldest first.
    pub fn tool_series(&self, tool_name: &str) -> Vec<ToolInvocationRecord> {
        self.lock()
            .per_tool
            .get(tool_name)
            .map(|series| series.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Clone of the error buffer, oldest first.
    pub fn errors(&self) -> Vec<ErrorRecord> {
        self.lock().errors.iter().cloned().collect()
    }

    /// Aggregate statistics over the completed traces, computed under the
    /// same lock for a consistent snapshot.
    pub fn summary_stats(&self) -> SummaryStats {
        let state = self.lock();
        let completed = &state.completed;
        if completed.is_empty() {
            return SummaryStats::default();
        }

        let n = completed.len();
        let mut latencies: Vec<f64> = completed
            .iter()
            .map(|t| t.total_latency.as_secs_f64())
            .collect();
        latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let successful = completed
            .iter()
            .filter(|t| t.status == TraceStatus::Success)
            .count();

        let mut tool_usage: HashMap<String, usize> = HashMap::new();
        for trace in completed {
            for record in &trace.tools_used {
                *tool_usage.entry(record.tool_name.clone()).or_default() += 1;
            }
        }
        let total_tools_used = tool_usage.values().sum();
        // Ties break toward the lexicographically smaller name so the
        // report is deterministic.
        let most_used_tool = tool_usage
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(name, _)| name.clone());

        SummaryStats {
            total_requests: n,
            successful_requests: successful,
            error_rate: (n - successful) as f64 / n as f64,
            total_errors: state.errors.len(),
            avg_latency: latencies.iter().sum::<f64>() / n as f64,
            min_latency: latencies[0],
            max_latency: latencies[n - 1],
            p50_latency: percentile(&latencies, 0.50),
            p95_latency: percentile(&latencies, 0.95),
            p99_latency: percentile(&latencies, 0.99),
            total_tools_used,
            unique_tools: tool_usage.len(),
            tool_usage,
            most_used_tool,
            avg_cpu_percent: completed
                .iter()
                .map(|t| f64::from(t.resource_usage.cpu_percent))
                .sum::<f64>()
                / n as f64,
            avg_memory_delta_mb: completed
                .iter()
                .map(|t| t.resource_usage.memory_delta_mb)
                .sum::<f64>()
                / n as f64,
        }
    }

    /// Timing aggregates for one component over the completed traces.
    ///
    /// A trace with several timings for the same component (one model call
    /// per loop iteration, say) contributes each of them.
    pub fn component_stats(&self, component: Component) -> ComponentStats {
        let state = self.lock();
        let mut latencies: Vec<f64> = state
            .completed
            .iter()
            .flat_map(|trace| &trace.components)
            .filter(|timing| timing.component == component)
            .map(|timing| timing.duration.as_secs_f64())
            .collect();
        if latencies.is_empty() {
            return ComponentStats::default();
        }
        latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let n = latencies.len();
        ComponentStats {
            count: n,
            avg_latency: latencies.iter().sum::<f64>() / n as f64,
            min_latency: latencies[0],
            max_latency: latencies[n - 1],
            p50_latency: percentile(&latencies, 0.50),
            p95_latency: percentile(&latencies, 0.95),
        }
    }

    /// Persist the bounded buffers as JSON, atomically (tmp + rename).
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        let buffers = {
            let state = self.lock();
            PersistedBuffers {
                completed: state.completed.iter().cloned().collect(),
                per_tool: state
                    .per_tool
                    .iter()
                    .map(|(name, series)| (name.clone(), series.iter().cloned().collect()))
                    .collect(),
                errors: state.errors.iter().cloned().collect(),
            }
        };

        let json =
            serde_json::to_string_pretty(&buffers).map_err(|e| PersistError::Serialization {
                details: e.to_string(),
            })?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| PersistError::Io {
                    details: format!("creating {}: {e}", parent.display()),
                })?;
            }
        }
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, json).map_err(|e| PersistError::Io {
            details: format!("writing {}: {e}", tmp.display()),
        })?;
        std::fs::rename(&tmp, path).map_err(|e| PersistError::Io {
            details: format!("renaming {}: {e}", tmp.display()),
        })?;
        Ok(())
    }

    /// Restore the bounded buffers from a JSON file. A missing file is an
    /// empty start; a corrupt file is backed up and skipped.
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(PersistError::Io {
                    details: format!("reading {}: {e}", path.display()),
                });
            }
        };

        let buffers: PersistedBuffers = match serde_json::from_str(&contents) {
            Ok(buffers) => buffers,
            Err(e) => {
                let backup = quarantine(path)?;
                tracing::warn!(
                    path = %path.display(),
                    backup = %backup.display(),
                    error = %e,
                    "Corrupt metrics file moved aside; starting empty"
                );
                return Ok(());
            }
        };

        let mut state = self.lock();
        state.completed = buffers.completed.into();
        while state.completed.len() > self.config.max_traces {
            state.completed.pop_front();
        }
        state.per_tool = buffers
            .per_tool
            .into_iter()
            .map(|(name, series)| (name, series.into()))
            .collect();
        for series in state.per_tool.values_mut() {
            while series.len() > self.config.max_per_tool {
                series.pop_front();
            }
        }
        state.errors = buffers.errors.into();
        while state.errors.len() > self.config.max_errors {
            state.errors.pop_front();
        }
        Ok(())
    }

    /// Drop all buffers and open traces.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.open.clear();
        state.completed.clear();
        state.per_tool.clear();
        state.errors.clear();
    }
}

impl Default for TraceCollector {
    fn default() -> Self {
        Self::new(CollectorConfig::default())
    }
}

/// Nearest-rank percentile over an already-sorted slice:
/// `sorted[min(floor(n * p), n - 1)]`.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = ((sorted.len() as f64 * p) as usize).min(sorted.len() - 1);
    sorted[index]
}

fn quarantine(path: &Path) -> Result<PathBuf, PersistError> {
    let stamp = Utc::now().format("%Y%m%d%H%M%S");
    let mut backup = path.as_os_str().to_owned();
    backup.push(format!(".corrupted.{stamp}"));
    let backup = PathBuf::from(backup);
    std::fs::rename(path, &backup).map_err(|e| PersistError::Io {
        details: format!("backing up {}: {e}", path.display()),
    })?;
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn collector() -> TraceCollector {
        TraceCollector::default()
    }

    fn session() -> SessionId {
        SessionId::parse("test-session").unwrap()
    }

    fn run_request(collector: &TraceCollector, latency: Duration, status: TraceStatus) -> TraceId {
        let trace_id = TraceId::generate();
        collector.start_request(trace_id.clone(), "query", session());
        // Overwrite the measured latency for deterministic stats.
        {
            let mut state = collector.lock();
            if let Some(open) = state.open.get_mut(&trace_id) {
                open.started = Instant::now() - latency;
            }
        }
        collector.end_request(&trace_id, "answer", status);
        trace_id
    }

    #[test]
    fn empty_collector_yields_all_zero_stats() {
        let stats = collector().summary_stats();
        assert_eq!(stats, SummaryStats::default());
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.avg_latency, 0.0);
        assert!(stats.most_used_tool.is_none());
    }

    #[test]
    fn percentiles_over_known_latencies() {
        let collector = collector();
        for secs in [1, 2, 3, 4, 5] {
            run_request(&collector, Duration::from_secs(secs), TraceStatus::Success);
        }

        let stats = collector.summary_stats();
        assert_eq!(stats.total_requests, 5);
        assert!((stats.p50_latency - 3.0).abs() < 0.05);
        assert!((stats.min_latency - 1.0).abs() < 0.05);
        assert!((stats.max_latency - 5.0).abs() < 0.05);
        assert!((stats.avg_latency - 3.0).abs() < 0.05);
    }

    #[test]
    fn error_rate_reflects_statuses() {
        let collector = collector();
        run_request(&collector, Duration::from_millis(10), TraceStatus::Success);
        run_request(&collector, Duration::from_millis(10), TraceStatus::Error);

        let stats = collector.summary_stats();
        assert_eq!(stats.successful_requests, 1);
        assert!((stats.error_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn component_stats_aggregate_across_traces() {
        let collector = collector();
        for secs in [1, 2, 3] {
            let trace_id = TraceId::generate();
            collector.start_request(trace_id.clone(), "query", session());
            collector.record_component(&trace_id, Component::ModelCall, Duration::from_secs(secs));
            collector.record_component(&trace_id, Component::Gate, Duration::from_millis(1));
            collector.end_request(&trace_id, "answer", TraceStatus::Success);
        }

        let stats = collector.component_stats(Component::ModelCall);
        assert_eq!(stats.count, 3);
        assert!((stats.avg_latency - 2.0).abs() < f64::EPSILON);
        assert!((stats.min_latency - 1.0).abs() < f64::EPSILON);
        assert!((stats.max_latency - 3.0).abs() < f64::EPSILON);
        assert!((stats.p50_latency - 2.0).abs() < f64::EPSILON);

        // Components never recorded yield the zero default.
        assert_eq!(
            collector.component_stats(Component::Memory),
            ComponentStats::default()
        );
    }

    #[test]
    fn duplicate_trace_id_keeps_the_first() {
        let collector = collector();
        let trace_id = TraceId::generate();
        collector.start_request(trace_id.clone(), "first", session());
        collector.start_request(trace_id.clone(), "second", session());
        assert_eq!(collector.open_count(), 1);

        collector.end_request(&trace_id, "done", TraceStatus::Success);
        let traces = collector.completed_traces();
        assert_eq!(traces[0].query, "first");
    }

    #[test]
    fn completed_buffer_is_bounded() {
        let collector = TraceCollector::new(CollectorConfig {
            max_traces: 3,
            ..CollectorConfig::default()
        });
        for _ in 0..10 {
            run_request(&collector, Duration::from_millis(1), TraceStatus::Success);
        }
        assert_eq!(collector.completed_traces().len(), 3);
        assert_eq!(collector.summary_stats().total_requests, 3);
    }

    #[test]
    fn per_tool_series_is_bounded_per_tool() {
        let collector = TraceCollector::new(CollectorConfig {
            max_per_tool: 2,
            ..CollectorConfig::default()
        });
        let trace_id = TraceId::generate();
        collector.start_request(trace_id.clone(), "query", session());
        for i in 0..5 {
            collector.record_tool(
                &trace_id,
                ToolInvocationRecord::new(
                    "search_books",
                    Duration::from_millis(i),
                    true,
                    "in",
                    "out",
                ),
            );
        }
        collector.record_tool(
            &trace_id,
            ToolInvocationRecord::new("get_policies", Duration::ZERO, true, "in", "out"),
        );

        assert_eq!(collector.tool_series("search_books").len(), 2);
        assert_eq!(collector.tool_series("get_policies").len(), 1);
    }

    #[test]
    fn error_buffer_is_bounded() {
        let collector = TraceCollector::new(CollectorConfig {
            max_errors: 4,
            ..CollectorConfig::default()
        });
        let trace_id = TraceId::generate();
        for i in 0..10 {
            collector.record_error(
                &trace_id,
                ErrorKind::Capability,
                &format!("error {i}"),
                Component::CapabilityExecution,
            );
        }
        let errors = collector.errors();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors[0].message, "error 6");
    }

    #[test]
    fn tool_usage_histogram_and_most_used() {
        let collector = collector();
        let trace_id = TraceId::generate();
        collector.start_request(trace_id.clone(), "query", session());
        for _ in 0..3 {
            collector.record_tool(
                &trace_id,
                ToolInvocationRecord::new("search_books", Duration::ZERO, true, "a", "b"),
            );
        }
        collector.record_tool(
            &trace_id,
            ToolInvocationRecord::new("get_policies", Duration::ZERO, true, "a", "b"),
        );
        collector.end_request(&trace_id, "done", TraceStatus::Success);

        let stats = collector.summary_stats();
        assert_eq!(stats.total_tools_used, 4);
        assert_eq!(stats.unique_tools, 2);
        assert_eq!(stats.tool_usage["search_books"], 3);
        assert_eq!(stats.most_used_tool.as_deref(), Some("search_books"));
    }

    #[test]
    fn concurrent_requests_record_independently() {
        let collector = Arc::new(TraceCollector::default());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let collector = Arc::clone(&collector);
            handles.push(std::thread::spawn(move || {
                for _ in 0..10 {
                    let trace_id = TraceId::generate();
                    collector.start_request(trace_id.clone(), "query", session());
                    collector.record_tool(
                        &trace_id,
                        ToolInvocationRecord::new(
                            "search_books",
                            Duration::from_millis(1),
                            true,
                            "in",
                            "out",
                        ),
                    );
                    collector.end_request(&trace_id, "answer", TraceStatus::Success);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = collector.summary_stats();
        assert_eq!(stats.total_requests, 80);
        assert_eq!(collector.open_count(), 0);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");

        let collector = collector();
        run_request(&collector, Duration::from_millis(5), TraceStatus::Success);
        collector.save_to_file(&path).unwrap();

        let restored = TraceCollector::default();
        restored.load_from_file(&path).unwrap();
        assert_eq!(restored.summary_stats().total_requests, 1);
    }

    #[test]
    fn corrupt_metrics_file_is_quarantined() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        std::fs::write(&path, "nonsense").unwrap();

        let collector = collector();
        collector.load_from_file(&path).unwrap();
        assert_eq!(collector.summary_stats().total_requests, 0);
        assert!(!path.exists());
    }
}
