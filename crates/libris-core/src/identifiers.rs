//! Validated identifier types used across the Libris crates
//!
//! All identifiers follow parse-don't-validate: construction goes through
//! `parse()` and returns a `Result`, and each identifier is a distinct
//! newtype so a `SessionId` can never be passed where a `TraceId` is
//! expected.
//!
//! # Validation Rules
//!
//! - Non-empty (minimum 1 character)
//! - Maximum 128 characters
//! - No leading or trailing whitespace
//! - Only alphanumeric characters, hyphens (`-`), underscores (`_`), and dots (`.`)
//! - No path traversal sequences (`../`, `./`)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length for all identifier types
pub const MAX_ID_LENGTH: usize = 128;

/// Error type for identifier validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdValidationError {
    #[error("Identifier cannot be empty")]
    Empty,
    #[error("Identifier cannot be whitespace-only")]
    WhitespaceOnly,
    #[error("Identifier cannot have leading or trailing whitespace")]
    LeadingTrailingWhitespace,
    #[error(
        "Identifier can only contain alphanumeric characters, hyphens, underscores, and dots"
    )]
    InvalidCharacters,
    #[error("Identifier too long ({length} chars, max {max})")]
    TooLong { length: usize, max: usize },
    #[error("Identifier cannot contain path traversal sequences (../)")]
    PathTraversal,
}

/// Validator shared by every identifier newtype
pub struct IdValidator;

impl IdValidator {
    /// Validate an identifier string against the shared rule set.
    pub fn validate(id: &str) -> Result<&str, IdValidationError> {
        if id.is_empty() {
            return Err(IdValidationError::Empty);
        }

        if id.trim().is_empty() {
            return Err(IdValidationError::WhitespaceOnly);
        }

        if id != id.trim() {
            return Err(IdValidationError::LeadingTrailingWhitespace);
        }

        if id.len() > MAX_ID_LENGTH {
            return Err(IdValidationError::TooLong {
                length: id.len(),
                max: MAX_ID_LENGTH,
            });
        }

        if id.contains("../") || id.contains("./") {
            return Err(IdValidationError::PathTraversal);
        }

        // Dots are allowed; traversal sequences were rejected above.
        if !id
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(IdValidationError::InvalidCharacters);
        }

        Ok(id)
    }
}

macro_rules! identifier_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse and validate an identifier from a string
            pub fn parse(id: impl AsRef<str>) -> Result<Self, IdValidationError> {
                IdValidator::validate(id.as_ref()).map(|s| Self(s.to_string()))
            }

            /// Get the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Create an identifier without validation (for testing only)
            #[doc(hidden)]
            pub fn new_unchecked(id: impl Into<String>) -> Self {
                Self(id.into())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdValidationError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }
    };
}

identifier_type! {
    /// Unique identifier for a conversation session
    ///
    /// Sessions correlate turns, profile facts, and request traces for one
    /// ongoing conversation. They key the session store and the per-identity
    /// rate limiter windows.
    SessionId
}

identifier_type! {
    /// Unique identifier for one logical request
    ///
    /// Every `chat` call opens exactly one trace under a fresh `TraceId`;
    /// the metrics collector keys its in-flight traces by it, so any number
    /// of concurrent requests can be open at once.
    TraceId
}

identifier_type! {
    /// Unique identifier for a custom capability
    CapabilityId
}

impl SessionId {
    /// Generate a new random session ID using UUID v4
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl TraceId {
    /// Generate a new random trace ID using UUID v4
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}
