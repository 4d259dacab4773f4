//! Built-in capabilities and the capability registry for Libris
//!
//! The registry binds raw model-supplied input against each capability's
//! positional schema at the dispatch boundary; the capabilities themselves
//! are pure functions of their bound arguments plus the shared [`Catalog`]
//! collaborator.

pub mod catalog;
pub mod registry;
pub mod standard;

pub use catalog::{Catalog, CatalogRecord, InMemoryCatalog};
pub use registry::{CapabilityInfo, CapabilityRegistry, InMemoryCapabilityRegistry};
pub use standard::{
    CheckAvailabilityCapability, ComputeLateFeeCapability, CreateLoanCapability,
    GetPoliciesCapability, ReserveBookCapability, SearchBooksCapability,
};
