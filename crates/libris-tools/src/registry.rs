//! Capability registry and dispatch
//!
//! The registry owns the map from capability names to implementations and
//! binds each call's raw input against the target's schema before invoking
//! it. `dispatch` is total over registered names; `try_dispatch` turns the
//! miss into an error value for callers that want `?`.

use crate::catalog::Catalog;
use crate::standard::{
    CheckAvailabilityCapability, ComputeLateFeeCapability, CreateLoanCapability,
    GetPoliciesCapability, ReserveBookCapability, SearchBooksCapability,
};
use libris_core::{
    Capability, CapabilityCall, CapabilityDispatch, CapabilityId, DispatchError, ExecutionResult,
    StandardCapability,
};
use std::collections::HashMap;
use std::sync::Arc;

/// One catalog entry describing a registered capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityInfo {
    pub name: String,
    pub description: String,
    /// Rendered positional signature, e.g. `(user_id, title, days = 14)`.
    pub signature: String,
}

/// Trait for dispatching capability calls.
pub trait CapabilityRegistry {
    /// Dispatch a call. `None` means exactly one thing: the capability name
    /// is not registered.
    fn dispatch(&self, call: CapabilityCall) -> Option<ExecutionResult>;

    /// Dispatch, turning an unknown capability into an error value.
    fn try_dispatch(&self, call: CapabilityCall) -> Result<ExecutionResult, DispatchError> {
        let name = call.name().to_string();
        self.dispatch(call)
            .ok_or(DispatchError::UnknownCapability { name })
    }

    /// Describe every registered capability, standard first, stable order.
    fn capability_catalog(&self) -> Vec<CapabilityInfo>;
}

/// In-memory registry holding the built-in capabilities plus custom ones.
pub struct InMemoryCapabilityRegistry {
    standard: HashMap<StandardCapability, Arc<dyn Capability>>,
    custom: HashMap<CapabilityId, Arc<dyn Capability>>,
}

impl InMemoryCapabilityRegistry {
    pub fn new() -> Self {
        Self {
            standard: HashMap::new(),
            custom: HashMap::new(),
        }
    }

    /// A registry pre-populated with every standard capability, all sharing
    /// one catalog collaborator.
    pub fn with_standard_capabilities(catalog: Arc<dyn Catalog>) -> Self {
        let mut registry = Self::new();
        registry.standard.insert(
            StandardCapability::SearchBooks,
            Arc::new(SearchBooksCapability::new(Arc::clone(&catalog))),
        );
        registry.standard.insert(
            StandardCapability::CheckAvailability,
            Arc::new(CheckAvailabilityCapability::new(Arc::clone(&catalog))),
        );
        registry.standard.insert(
            StandardCapability::CreateLoan,
            Arc::new(CreateLoanCapability::new(Arc::clone(&catalog))),
        );
        registry
            .standard
            .insert(StandardCapability::ComputeLateFee, Arc::new(ComputeLateFeeCapability));
        registry.standard.insert(
            StandardCapability::GetPolicies,
            Arc::new(GetPoliciesCapability::new(catalog)),
        );
        registry
            .standard
            .insert(StandardCapability::ReserveBook, Arc::new(ReserveBookCapability));
        registry
    }

    /// Register a custom capability under its own validated id.
    ///
    /// Standard names resolve through the standard map first, so a custom
    /// capability can never shadow a built-in one.
    pub fn register(
        &mut self,
        capability: Arc<dyn Capability>,
    ) -> Result<(), libris_core::IdValidationError> {
        let id = CapabilityId::parse(capability.name())?;
        tracing::debug!(capability = %id, "Registered custom capability");
        self.custom.insert(id, capability);
        Ok(())
    }

    fn resolve(&self, dispatch: &CapabilityDispatch) -> Option<&Arc<dyn Capability>> {
        match dispatch {
            CapabilityDispatch::Standard(standard) => self.standard.get(standard),
            CapabilityDispatch::Custom(id) => self.custom.get(id),
        }
    }
}

impl CapabilityRegistry for InMemoryCapabilityRegistry {
    fn dispatch(&self, call: CapabilityCall) -> Option<ExecutionResult> {
        let capability = self.resolve(&call.dispatch)?;
        tracing::debug!(capability = call.name(), "Dispatching capability call");

        // Bind the raw comma-separated input against the schema here so no
        // capability ever sees unvalidated arguments.
        let result = match capability.schema().bind(&call.input) {
            Ok(args) => capability.invoke(&args),
            Err(reason) => ExecutionResult::failed(reason),
        };
        Some(result)
    }

    fn capability_catalog(&self) -> Vec<CapabilityInfo> {
        let mut infos: Vec<CapabilityInfo> = StandardCapability::all()
            .iter()
            .filter_map(|standard| self.standard.get(standard))
            .map(|cap| CapabilityInfo {
                name: cap.name().to_string(),
                description: cap.description().to_string(),
                signature: cap.schema().render(),
            })
            .collect();

        let mut custom: Vec<&Arc<dyn Capability>> = self.custom.values().collect();
        custom.sort_by(|a, b| a.name().cmp(b.name()));
        infos.extend(custom.into_iter().map(|cap| CapabilityInfo {
            name: cap.name().to_string(),
            description: cap.description().to_string(),
            signature: cap.schema().render(),
        }));
        infos
    }
}

impl Default for InMemoryCapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
