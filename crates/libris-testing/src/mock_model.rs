//! Scripted mock model client
//!
//! Deterministic stand-in for a real model: responses play back in
//! scripted order, and once the script is exhausted a fallback response
//! repeats forever. Every prompt the mock sees is captured for
//! assertions.

use libris_core::{ModelClient, ModelError};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A model client that replays a script.
pub struct MockModelClient {
    script: Mutex<VecDeque<Result<String, ModelError>>>,
    fallback: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl MockModelClient {
    /// A mock with no scripted responses and no fallback; any call fails
    /// with `ModelError::Unavailable`.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Script successful responses in order.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let script = responses
            .into_iter()
            .map(|r| Ok(r.into()))
            .collect::<VecDeque<_>>();
        Self {
            script: Mutex::new(script),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Script full results (successes and errors) in order.
    pub fn with_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<String, ModelError>>,
    {
        Self {
            script: Mutex::new(results.into_iter().collect()),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// After the script runs out, repeat this response forever. Useful for
    /// driving a loop that never sees a final answer.
    pub fn with_fallback(mut self, response: impl Into<String>) -> Self {
        self.fallback = Some(response.into());
        self
    }

    /// Number of completions requested so far.
    pub fn call_count(&self) -> usize {
        self.lock_prompts().len()
    }

    /// All prompts seen so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.lock_prompts().clone()
    }

    /// Whether any prompt contained the given fragment.
    pub fn was_prompted_with(&self, fragment: &str) -> bool {
        self.lock_prompts().iter().any(|p| p.contains(fragment))
    }

    /// The last prompt seen, if any.
    pub fn last_prompt(&self) -> Option<String> {
        self.lock_prompts().last().cloned()
    }

    fn lock_prompts(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockModelClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelClient for MockModelClient {
    fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        self.lock_prompts().push(prompt.to_string());

        let mut script = self
            .script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(next) = script.pop_front() {
            return next;
        }
        match &self.fallback {
            Some(response) => Ok(response.clone()),
            None => Err(ModelError::Unavailable(
                "mock script exhausted".to_string(),
            )),
        }
    }
}
