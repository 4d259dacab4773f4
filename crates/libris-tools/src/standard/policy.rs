use crate::catalog::Catalog;
use libris_core::{
    ArgValue, Capability, CapabilitySchema, ExecutionResult, ParamSpec, StandardCapability,
};
use std::sync::Arc;

/// `get_policies(query)`: keyword-routed canned policy answers from the
/// catalog collaborator.
pub struct GetPoliciesCapability {
    catalog: Arc<dyn Catalog>,
}

impl GetPoliciesCapability {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }
}

impl Capability for GetPoliciesCapability {
    fn name(&self) -> &str {
        StandardCapability::GetPolicies.name()
    }

    fn description(&self) -> &str {
        StandardCapability::GetPolicies.description()
    }

    fn schema(&self) -> CapabilitySchema {
        CapabilitySchema::new(vec![ParamSpec::text("query")])
    }

    fn invoke(&self, args: &[ArgValue]) -> ExecutionResult {
        ExecutionResult::success(self.catalog.lookup_policy(&args[0].as_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;

    #[test]
    fn routes_through_the_catalog() {
        let cap = GetPoliciesCapability::new(Arc::new(InMemoryCatalog::seeded()));
        let args = cap.schema().bind("what is the loan period in days").unwrap();
        assert!(cap.invoke(&args).output().contains("14 calendar days"));
    }
}
