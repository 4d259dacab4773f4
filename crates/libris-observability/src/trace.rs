//! Request trace data model
//!
//! A trace is the complete record of one logical request: component
//! timings, tool invocations, errors, the resource delta, and the final
//! status. Traces are frozen by the collector on `end_request` and kept in
//! a bounded buffer.

use chrono::{DateTime, Utc};
use libris_core::{SessionId, TraceId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pipeline stages a trace can attribute time or errors to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Gate,
    ModelCall,
    Parsing,
    CapabilityExecution,
    Memory,
}

impl Component {
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Gate => "gate",
            Component::ModelCall => "model_call",
            Component::Parsing => "parsing",
            Component::CapabilityExecution => "capability_execution",
            Component::Memory => "memory",
        }
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error categories recorded against traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    RateLimit,
    Model,
    Dispatch,
    Capability,
    Persistence,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::Model => "model",
            ErrorKind::Dispatch => "dispatch",
            ErrorKind::Capability => "capability",
            ErrorKind::Persistence => "persistence",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final status of a completed trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStatus {
    Success,
    Error,
}

/// Time attributed to one pipeline component within a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentTiming {
    pub component: Component,
    pub duration: Duration,
}

const RECORD_TEXT_CAP: usize = 200;

/// One tool invocation within a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationRecord {
    pub tool_name: String,
    pub latency: Duration,
    pub success: bool,
    pub input: String,
    pub output: String,
    pub timestamp: DateTime<Utc>,
}

impl ToolInvocationRecord {
    /// Build a record, capping input and output at 200 characters.
    pub fn new(
        tool_name: impl Into<String>,
        latency: Duration,
        success: bool,
        input: &str,
        output: &str,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            latency,
            success,
            input: truncate(input),
            output: truncate(output),
            timestamp: Utc::now(),
        }
    }
}

fn truncate(text: &str) -> String {
    text.chars().take(RECORD_TEXT_CAP).collect()
}

/// One recorded error with its category and originating component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub message: String,
    pub component: Component,
    pub timestamp: DateTime<Utc>,
}

/// Process resource usage at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub cpu_percent: f32,
    pub memory_mb: f64,
}

/// Resource usage attributed to one request: CPU at completion, memory
/// growth across the request.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceDelta {
    pub cpu_percent: f32,
    pub memory_delta_mb: f64,
}

impl ResourceDelta {
    pub fn between(start: ResourceSnapshot, end: ResourceSnapshot) -> Self {
        Self {
            cpu_percent: end.cpu_percent,
            memory_delta_mb: end.memory_mb - start.memory_mb,
        }
    }
}

/// The frozen record of one completed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestTrace {
    pub trace_id: TraceId,
    pub session_id: SessionId,
    pub query: String,
    pub answer: String,
    pub status: TraceStatus,
    pub started_at: DateTime<Utc>,
    pub total_latency: Duration,
    pub components: Vec<ComponentTiming>,
    pub tools_used: Vec<ToolInvocationRecord>,
    pub resource_usage: ResourceDelta,
}

impl RequestTrace {
    /// Count of tool invocations that succeeded.
    pub fn successful_tool_invocations(&self) -> usize {
        self.tools_used.iter().filter(|t| t.success).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_record_caps_input_and_output() {
        let long = "x".repeat(500);
        let record =
            ToolInvocationRecord::new("search_books", Duration::from_millis(5), true, &long, &long);
        assert_eq!(record.input.chars().count(), 200);
        assert_eq!(record.output.chars().count(), 200);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let accented = "á".repeat(300);
        let record =
            ToolInvocationRecord::new("search_books", Duration::ZERO, true, &accented, "ok");
        assert_eq!(record.input.chars().count(), 200);
    }

    #[test]
    fn resource_delta_tracks_memory_growth() {
        let start = ResourceSnapshot {
            cpu_percent: 1.0,
            memory_mb: 100.0,
        };
        let end = ResourceSnapshot {
            cpu_percent: 7.5,
            memory_mb: 104.0,
        };
        let delta = ResourceDelta::between(start, end);
        assert_eq!(delta.cpu_percent, 7.5);
        assert_eq!(delta.memory_delta_mb, 4.0);
    }

    #[test]
    fn component_and_error_kind_labels() {
        assert_eq!(Component::ModelCall.as_str(), "model_call");
        assert_eq!(ErrorKind::RateLimit.as_str(), "rate_limit");
    }
}
