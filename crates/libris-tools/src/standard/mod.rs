//! Built-in capability implementations
//!
//! One struct per [`libris_core::StandardCapability`] variant. Each holds at
//! most a shared catalog handle and stays a pure function of its bound
//! arguments plus that collaborator.

mod circulation;
mod fees;
mod policy;
mod search;

pub use circulation::{CheckAvailabilityCapability, CreateLoanCapability, ReserveBookCapability};
pub use fees::ComputeLateFeeCapability;
pub use policy::GetPoliciesCapability;
pub use search::SearchBooksCapability;
