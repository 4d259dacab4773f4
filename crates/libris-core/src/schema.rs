//! Positional argument schemas for capabilities
//!
//! The reasoning loop hands every capability a single comma-separated input
//! string parsed out of free-form model prose. Instead of improvising arity
//! and types from that string at each call site, every capability declares an
//! explicit positional schema and the registry binds the raw input against it
//! at the dispatch boundary.

use crate::capability::FailureReason;
use serde::{Deserialize, Serialize};

/// The type a positional parameter accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Text,
    Integer,
}

/// A bound argument value after parsing and coercion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Text(String),
    Integer(i64),
}

impl ArgValue {
    /// Get the argument as text, rendering integers with `to_string`.
    pub fn as_text(&self) -> String {
        match self {
            ArgValue::Text(s) => s.clone(),
            ArgValue::Integer(n) => n.to_string(),
        }
    }

    /// Get the argument as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ArgValue::Integer(n) => Some(*n),
            ArgValue::Text(_) => None,
        }
    }
}

/// One positional parameter in a capability schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    /// Filled in when the caller supplies fewer arguments than the schema.
    pub default: Option<ArgValue>,
}

impl ParamSpec {
    /// A required text parameter.
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Text,
            default: None,
        }
    }

    /// A required integer parameter.
    pub fn integer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Integer,
            default: None,
        }
    }

    /// An integer parameter with a default value.
    pub fn integer_with_default(name: impl Into<String>, default: i64) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Integer,
            default: Some(ArgValue::Integer(default)),
        }
    }
}

/// Fixed positional parameter list for one capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilitySchema {
    pub params: Vec<ParamSpec>,
}

impl CapabilitySchema {
    pub fn new(params: Vec<ParamSpec>) -> Self {
        Self { params }
    }

    /// Bind a raw comma-separated input string against this schema.
    ///
    /// Arguments are split on commas and trimmed. Integer-typed positions
    /// are coerced with `parse::<i64>`; a value that fails coercion passes
    /// through as text rather than failing the call. Missing trailing
    /// arguments take their declared defaults; a missing argument without a
    /// default, or more arguments than declared parameters, is an
    /// `InvalidArguments` failure.
    pub fn bind(&self, raw_input: &str) -> Result<Vec<ArgValue>, FailureReason> {
        let supplied: Vec<&str> = if raw_input.trim().is_empty() {
            Vec::new()
        } else {
            raw_input.split(',').map(str::trim).collect()
        };

        if supplied.len() > self.params.len() {
            return Err(FailureReason::InvalidArguments {
                message: format!(
                    "expected at most {} argument(s), got {}",
                    self.params.len(),
                    supplied.len()
                ),
            });
        }

        let mut bound = Vec::with_capacity(self.params.len());
        for (position, param) in self.params.iter().enumerate() {
            match supplied.get(position) {
                Some(raw) => bound.push(Self::coerce(param.kind, raw)),
                None => match &param.default {
                    Some(default) => bound.push(default.clone()),
                    None => {
                        return Err(FailureReason::InvalidArguments {
                            message: format!(
                                "missing required argument '{}' at position {}",
                                param.name,
                                position + 1
                            ),
                        });
                    }
                },
            }
        }

        Ok(bound)
    }

    fn coerce(kind: ParamKind, raw: &str) -> ArgValue {
        match kind {
            ParamKind::Text => ArgValue::Text(raw.to_string()),
            ParamKind::Integer => match raw.parse::<i64>() {
                Ok(n) => ArgValue::Integer(n),
                // Coercion failure passes the text through; the capability
                // decides whether it can live with it.
                Err(_) => ArgValue::Text(raw.to_string()),
            },
        }
    }

    /// Render the schema as a short human-readable signature,
    /// e.g. `(user_id, title, days = 14)`.
    pub fn render(&self) -> String {
        let parts: Vec<String> = self
            .params
            .iter()
            .map(|p| match &p.default {
                Some(default) => format!("{} = {}", p.name, default.as_text()),
                None => p.name.clone(),
            })
            .collect();
        format!("({})", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan_schema() -> CapabilitySchema {
        CapabilitySchema::new(vec![
            ParamSpec::text("user_id"),
            ParamSpec::text("title"),
            ParamSpec::integer_with_default("days", 14),
        ])
    }

    #[test]
    fn binds_full_argument_list_with_coercion() {
        let args = loan_schema().bind("u-42, Clean Code, 7").unwrap();
        assert_eq!(args[0], ArgValue::Text("u-42".to_string()));
        assert_eq!(args[1], ArgValue::Text("Clean Code".to_string()));
        assert_eq!(args[2], ArgValue::Integer(7));
    }

    #[test]
    fn missing_trailing_argument_takes_default() {
        let args = loan_schema().bind("u-42, Clean Code").unwrap();
        assert_eq!(args[2], ArgValue::Integer(14));
    }

    #[test]
    fn missing_required_argument_fails() {
        let err = loan_schema().bind("u-42").unwrap_err();
        assert!(matches!(err, FailureReason::InvalidArguments { .. }));
    }

    #[test]
    fn too_many_arguments_fails() {
        let err = loan_schema().bind("a, b, 1, extra").unwrap_err();
        assert!(matches!(err, FailureReason::InvalidArguments { .. }));
    }

    #[test]
    fn failed_integer_coercion_passes_text_through() {
        let args = loan_schema().bind("u-42, Clean Code, soon").unwrap();
        assert_eq!(args[2], ArgValue::Text("soon".to_string()));
    }

    #[test]
    fn empty_input_binds_empty_schema() {
        let schema = CapabilitySchema::new(vec![]);
        assert!(schema.bind("").unwrap().is_empty());
        assert!(schema.bind("   ").unwrap().is_empty());
    }

    #[test]
    fn renders_signature_with_defaults() {
        assert_eq!(loan_schema().render(), "(user_id, title, days = 14)");
    }
}
