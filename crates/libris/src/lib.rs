//! # Libris
//!
//! Libris is a conversational library-assistant runtime. An [`Assistant`]
//! answers user questions by running a ReAct-style reasoning loop: the
//! model thinks in free text, requests tool calls via `Action:` markers,
//! reads back observations, and terminates with a `Final Answer:`. Around
//! that loop the runtime provides bounded per-session memory with profile
//! extraction, an admission gate (validation, rate limiting, PII
//! redaction), and a concurrent trace collector with summary statistics.
//!
//! ## Core pieces
//!
//! - **[`Assistant`]**: the facade; `chat` always returns text, even on
//!   internal failure
//! - **[`ModelClient`]**: the seam for the language model backend
//! - **[`Capability`] / [`CapabilityRegistry`]**: typed tools with
//!   positional argument schemas, dispatched by name
//! - **[`ConversationMemory`] / [`SessionStore`]**: bounded turn history
//!   with rolling summaries and extracted profile facts
//! - **[`TraceCollector`]**: per-request traces and aggregate stats
//!
//! ## Quick Start
//!
//! ```rust
//! use libris::{
//!     Assistant, AssistantConfig, InMemoryCapabilityRegistry, InMemoryCatalog, ModelClient,
//!     ModelError, SessionId,
//! };
//! use std::sync::Arc;
//!
//! // Any backend goes behind the ModelClient seam.
//! struct CannedModel;
//!
//! impl ModelClient for CannedModel {
//!     fn complete(&self, _prompt: &str) -> Result<String, ModelError> {
//!         Ok("Final Answer: We have five titles on the shelf.".to_string())
//!     }
//! }
//!
//! let registry = Arc::new(InMemoryCapabilityRegistry::with_standard_capabilities(
//!     Arc::new(InMemoryCatalog::seeded()),
//! ));
//! let assistant = Assistant::new(Arc::new(CannedModel), registry, AssistantConfig::default());
//!
//! let session = SessionId::parse("quickstart")?;
//! let answer = assistant.chat("what do you have in the catalog?", &session);
//! assert_eq!(answer, "We have five titles on the shelf.");
//! # Ok::<(), libris::IdValidationError>(())
//! ```

// ============================================================================
// Module aliases for namespaced access
// ============================================================================

pub use libris_core as core;
pub use libris_memory as memory;
pub use libris_observability as observability;
pub use libris_runtime as runtime;
pub use libris_tools as tools;

#[cfg(feature = "testing")]
pub use libris_testing as testing;

// ============================================================================
// Identifiers
// ============================================================================

pub use libris_core::{CapabilityId, IdValidationError, IdValidator, SessionId, TraceId};

// ============================================================================
// Capabilities and schemas
// ============================================================================

pub use libris_core::{
    ArgValue, Capability, CapabilityCall, CapabilityDispatch, CapabilitySchema, ExecutionResult,
    FailureReason, ParamKind, ParamSpec, StandardCapability,
};

pub use libris_tools::{
    CapabilityInfo, CapabilityRegistry, Catalog, CatalogRecord, InMemoryCapabilityRegistry,
    InMemoryCatalog,
};

// ============================================================================
// Model client seam
// ============================================================================

pub use libris_core::{ModelClient, ModelError};

// ============================================================================
// Admission gate
// ============================================================================

pub use libris_core::{
    AdmissionGate, GateError, InputValidator, PiiRedactor, RateLimitConfig, RateLimiter,
    ValidationCategory, ValidationConfig,
};

// ============================================================================
// Memory
// ============================================================================

pub use libris_memory::{
    ConversationMemory, ConversationTurn, FileMemoryStore, KnowledgeItem, KnowledgeStore,
    MemoryConfig, MemorySnapshot, ProfileKey, Role, SessionStore,
};

// ============================================================================
// Observability
// ============================================================================

pub use libris_observability::{
    CollectorConfig, Component, ComponentStats, ErrorKind, RequestTrace, SummaryStats,
    ToolInvocationRecord, TraceCollector, TraceStatus, init_tracing,
};

// ============================================================================
// Runtime
// ============================================================================

pub use libris_runtime::{
    Assistant, AssistantConfig, LoopConfig, MemoryOverview, OutputParser, ParsedModelOutput,
    Planner, ReasoningLoop,
};

// ============================================================================
// Errors
// ============================================================================

pub use libris_core::{DispatchError, LibrisError, LibrisResult, MemoryError};
