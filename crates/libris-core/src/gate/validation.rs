//! Input validation against length caps and instruction-override patterns

use crate::error::{GateError, ValidationCategory};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum accepted input length in characters.
    pub max_input_chars: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 5000,
        }
    }
}

/// Validator for incoming user input.
///
/// This is a conservative deny-list, not a classifier: false negatives are
/// expected and acceptable, and every rejection is logged as a warning with
/// the matched category so a rejected legitimate input is visible rather
/// than silently dropped. The caller only ever receives the category, never
/// the matched pattern.
pub struct InputValidator {
    config: ValidationConfig,
    injection_patterns: Vec<Regex>,
}

impl InputValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            injection_patterns: Self::compile_injection_patterns(),
        }
    }

    /// Validate one input, rejecting over-length text and instruction
    /// overrides.
    pub fn validate(&self, input: &str) -> Result<(), GateError> {
        let char_count = input.chars().count();
        if char_count > self.config.max_input_chars {
            tracing::warn!(
                chars = char_count,
                max = self.config.max_input_chars,
                "Rejected over-length input"
            );
            return Err(GateError::ValidationRejected {
                category: ValidationCategory::TooLong,
            });
        }

        for pattern in &self.injection_patterns {
            if pattern.is_match(input) {
                tracing::warn!(
                    pattern = pattern.as_str(),
                    "Rejected input matching instruction-override pattern"
                );
                return Err(GateError::ValidationRejected {
                    category: ValidationCategory::InjectionPattern,
                });
            }
        }

        Ok(())
    }

    fn compile_injection_patterns() -> Vec<Regex> {
        let patterns = [
            r"(?i)ignore\s+(previous|all)\s+instructions",
            r"(?i)disregard\s+(previous|all)\s+instructions",
            r"(?i)you\s+are\s+now",
            r"(?i)act\s+as\s+(if|a|an)\b",
            r"(?i)new\s+instructions:",
            r"(?i)system\s+message:",
            r"(?i)override\s+instructions",
            r"(?i)</system>",
            r"(?i)<\|im_start\|>",
            r"(?i)<\|im_end\|>",
        ];

        patterns
            .into_iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect()
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
