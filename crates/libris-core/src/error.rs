//! Error taxonomy for the Libris runtime
//!
//! Every failure in the workspace is a value in one of these enums. Loop-
//! internal failures (unknown capability, capability execution) never reach
//! this level; they are converted into observations so the loop always
//! converges on some answer. Only admission rejections and model-client
//! failures surface to the caller, and the `Assistant` facade turns even
//! those into textual answers.

use thiserror::Error;

/// Admission gate rejections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// Input failed validation. The matched category stays in the logs; the
    /// caller only ever sees a generic safety message.
    #[error("Input rejected: {category}")]
    ValidationRejected { category: ValidationCategory },

    /// The identity exceeded its sliding-window request budget.
    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

/// What the input validator tripped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCategory {
    TooLong,
    InjectionPattern,
}

impl ValidationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCategory::TooLong => "too_long",
            ValidationCategory::InjectionPattern => "injection_pattern",
        }
    }
}

impl std::fmt::Display for ValidationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Capability dispatch failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Unknown capability: {name}")]
    UnknownCapability { name: String },
}

/// Failures reported by the model-client collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Model unavailable: {0}")]
    Unavailable(String),

    #[error("Model call timed out: {0}")]
    Timeout(String),
}

/// Memory persistence failures.
///
/// `Corrupt` is only ever logged: loaders degrade to empty state instead of
/// propagating it.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Corrupt persisted state: {details}")]
    Corrupt { details: String },

    #[error("Memory I/O failed: {details}")]
    Io { details: String },

    #[error("Memory serialization failed: {details}")]
    Serialization { details: String },
}

/// Top-level error wrapper for callers that want one error type.
#[derive(Debug, Error)]
pub enum LibrisError {
    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Memory(#[from] MemoryError),
}

/// Convenience result alias.
pub type LibrisResult<T> = Result<T, LibrisError>;
