//! Observability for the Libris runtime
//!
//! Request traces keyed by trace id, a concurrent collector with bounded
//! buffers, aggregate summary statistics, process resource sampling, and
//! the tracing-subscriber bootstrap.

pub mod collector;
pub mod resource;
pub mod trace;

pub use collector::{CollectorConfig, ComponentStats, PersistError, SummaryStats, TraceCollector};
pub use resource::ResourceSampler;
pub use trace::{
    Component, ComponentTiming, ErrorKind, ErrorRecord, RequestTrace, ResourceDelta,
    ResourceSnapshot, ToolInvocationRecord, TraceStatus,
};

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber: env-filtered (`RUST_LOG`,
/// default `info`), compact fmt output.
///
/// Returns an error when a global subscriber is already installed.
pub fn init_tracing() -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}
