//! Mock capabilities with invocation counting

use libris_core::{
    ArgValue, Capability, CapabilitySchema, ExecutionResult, FailureReason, ParamSpec,
};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A capability that echoes its input and counts invocations.
pub struct MockCapability {
    name: String,
    response: String,
    fail: bool,
    invocations: AtomicUsize,
}

impl MockCapability {
    /// A mock that succeeds with a fixed response.
    pub fn new(name: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            response: response.into(),
            fail: false,
            invocations: AtomicUsize::new(0),
        }
    }

    /// A mock that always fails execution with the given message.
    pub fn failing(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            response: message.into(),
            fail: true,
            invocations: AtomicUsize::new(0),
        }
    }

    pub fn invocation_count(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

impl Capability for MockCapability {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Test capability with a scripted response."
    }

    fn schema(&self) -> CapabilitySchema {
        CapabilitySchema::new(vec![ParamSpec::text("input")])
    }

    fn invoke(&self, args: &[ArgValue]) -> ExecutionResult {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            ExecutionResult::failed(FailureReason::ExecutionFailed {
                message: self.response.clone(),
            })
        } else {
            ExecutionResult::success(format!("{}: {}", self.response, args[0].as_text()))
        }
    }
}
