//! Shared setup for the integration tests.

use libris::{Assistant, AssistantConfig, InMemoryCapabilityRegistry, InMemoryCatalog, ModelClient};
use libris_testing::MockModelClient;
use std::sync::Arc;

/// Build an assistant over the seeded catalog and a scripted model,
/// returning the mock handle for prompt assertions.
pub fn assistant_with(
    model: MockModelClient,
    config: AssistantConfig,
) -> (Assistant, Arc<MockModelClient>) {
    let model = Arc::new(model);
    let registry = Arc::new(InMemoryCapabilityRegistry::with_standard_capabilities(
        Arc::new(InMemoryCatalog::seeded()),
    ));
    let assistant = Assistant::new(Arc::clone(&model) as Arc<dyn ModelClient>, registry, config);
    (assistant, model)
}
