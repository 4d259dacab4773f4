//! # Libris Core
//!
//! Core traits and types for the Libris conversational library-assistant
//! runtime: validated identifiers, the capability model with positional
//! argument schemas, the error taxonomy, the model-client seam, and the
//! admission gate.
//!
//! The crates above this one compose these pieces: `libris-tools` implements
//! the built-in capabilities, `libris-memory` the conversational memory,
//! `libris-observability` the trace collector, and `libris-runtime` the
//! reasoning loop and the `Assistant` facade.

pub mod capability;
pub mod error;
pub mod gate;
pub mod identifiers;
pub mod model;
pub mod schema;

pub use capability::{
    Capability, CapabilityCall, CapabilityDispatch, ExecutionResult, FailureReason,
    StandardCapability,
};
pub use error::{
    DispatchError, GateError, LibrisError, LibrisResult, MemoryError, ModelError,
    ValidationCategory,
};
pub use gate::{
    AdmissionGate, InputValidator, PiiRedactor, RateLimitConfig, RateLimiter, ValidationConfig,
};
pub use identifiers::{CapabilityId, IdValidationError, IdValidator, SessionId, TraceId};
pub use model::ModelClient;
pub use schema::{ArgValue, CapabilitySchema, ParamKind, ParamSpec};
