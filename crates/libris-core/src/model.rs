//! Model-client collaborator seam
//!
//! The language model behind the reasoning loop is an external collaborator:
//! text in, text out, may fail or time out. Implementations own their own
//! timeout behavior; the loop never waits on anything but this call and
//! bounds itself solely by its iteration budget.

use crate::error::ModelError;

/// A blocking completion client for the reasoning loop.
///
/// Implementations must be safe to share across concurrently running
/// requests; the trait is object-safe so the runtime can hold
/// `Arc<dyn ModelClient>`.
pub trait ModelClient: Send + Sync {
    /// Run one completion over the accumulated prompt.
    fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

impl<T: ModelClient + ?Sized> ModelClient for std::sync::Arc<T> {
    fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        (**self).complete(prompt)
    }
}
