//! Capability types for strongly-typed tool dispatch
//!
//! The built-in capabilities form a closed enum so dispatch is a total
//! function over known names, while custom capabilities remain possible
//! through validated [`CapabilityId`]s.

use crate::identifiers::{CapabilityId, IdValidationError};
use crate::schema::{ArgValue, CapabilitySchema};

/// The built-in library-domain capabilities.
///
/// Each variant corresponds to one capability implementation in
/// `libris-tools`. The enum keeps unknown-name handling explicit: anything
/// `from_name` does not recognize is either a custom capability or a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardCapability {
    SearchBooks,
    CheckAvailability,
    CreateLoan,
    ComputeLateFee,
    GetPolicies,
    ReserveBook,
}

impl StandardCapability {
    /// Get the capability name as the string the model is told to use.
    pub fn name(&self) -> &'static str {
        match self {
            StandardCapability::SearchBooks => "search_books",
            StandardCapability::CheckAvailability => "check_availability",
            StandardCapability::CreateLoan => "create_loan",
            StandardCapability::ComputeLateFee => "compute_late_fee",
            StandardCapability::GetPolicies => "get_policies",
            StandardCapability::ReserveBook => "reserve_book",
        }
    }

    /// Try to parse a capability name into a standard variant.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "search_books" => Some(StandardCapability::SearchBooks),
            "check_availability" => Some(StandardCapability::CheckAvailability),
            "create_loan" => Some(StandardCapability::CreateLoan),
            "compute_late_fee" => Some(StandardCapability::ComputeLateFee),
            "get_policies" => Some(StandardCapability::GetPolicies),
            "reserve_book" => Some(StandardCapability::ReserveBook),
            _ => None,
        }
    }

    /// Short description used in the capability catalog and the system prompt.
    pub fn description(&self) -> &'static str {
        match self {
            StandardCapability::SearchBooks => {
                "Search the catalog by title, author, or genre. Input: search term."
            }
            StandardCapability::CheckAvailability => {
                "Check whether a specific book is available. Input: book title."
            }
            StandardCapability::CreateLoan => {
                "Create a book loan. Input: user id, book title, loan days (optional, default 14)."
            }
            StandardCapability::ComputeLateFee => {
                "Compute the late-return fee. Input: days overdue, fee per day (optional, default 500)."
            }
            StandardCapability::GetPolicies => {
                "Look up library policies. Input: a policy question."
            }
            StandardCapability::ReserveBook => {
                "Reserve a book that is not available. Input: user id, book title."
            }
        }
    }

    /// Get all standard capabilities as a slice.
    pub fn all() -> &'static [StandardCapability] {
        &[
            StandardCapability::SearchBooks,
            StandardCapability::CheckAvailability,
            StandardCapability::CreateLoan,
            StandardCapability::ComputeLateFee,
            StandardCapability::GetPolicies,
            StandardCapability::ReserveBook,
        ]
    }
}

impl std::fmt::Display for StandardCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Capability dispatch method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityDispatch {
    /// Dispatch to a built-in capability, validated at compile time.
    Standard(StandardCapability),
    /// Dispatch to a custom capability by validated id.
    Custom(CapabilityId),
}

impl CapabilityDispatch {
    /// Create a dispatch method from a capability name string.
    pub fn from_name(name: &str) -> Result<Self, IdValidationError> {
        if let Some(standard) = StandardCapability::from_name(name) {
            Ok(CapabilityDispatch::Standard(standard))
        } else {
            Ok(CapabilityDispatch::Custom(CapabilityId::parse(name)?))
        }
    }

    /// Get the capability name as a string.
    pub fn name(&self) -> &str {
        match self {
            CapabilityDispatch::Standard(cap) => cap.name(),
            CapabilityDispatch::Custom(id) => id.as_str(),
        }
    }
}

/// A request to invoke one capability with a raw input string.
///
/// The input is still the unparsed comma-separated text extracted from the
/// model's `Action Input:` line; the registry binds it against the target
/// capability's schema before execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityCall {
    pub dispatch: CapabilityDispatch,
    pub input: String,
}

impl CapabilityCall {
    /// Create a new call, validating the capability name.
    pub fn new(name: &str, input: &str) -> Result<Self, IdValidationError> {
        Ok(Self {
            dispatch: CapabilityDispatch::from_name(name)?,
            input: input.to_string(),
        })
    }

    /// Create a call for a standard capability.
    pub fn from_standard(capability: StandardCapability, input: impl Into<String>) -> Self {
        Self {
            dispatch: CapabilityDispatch::Standard(capability),
            input: input.into(),
        }
    }

    pub fn name(&self) -> &str {
        self.dispatch.name()
    }
}

/// Categorized failure reasons for capability execution.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureReason {
    /// The bound arguments did not satisfy the capability's schema.
    InvalidArguments { message: String },
    /// A referenced record (book, user) does not exist.
    NotFound { resource: String },
    /// The capability ran but could not complete the operation.
    ExecutionFailed { message: String },
}

impl FailureReason {
    /// Get a human-readable error message
    pub fn message(&self) -> String {
        match self {
            FailureReason::InvalidArguments { message } => {
                format!("Invalid arguments: {}", message)
            }
            FailureReason::NotFound { resource } => format!("Not found: {}", resource),
            FailureReason::ExecutionFailed { message } => message.clone(),
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// The result of executing a capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// Capability executed successfully with the given output text.
    Success { output: String },
    /// Capability execution failed with a structured reason.
    Failure { reason: FailureReason },
}

impl ExecutionResult {
    pub fn success(output: impl Into<String>) -> Self {
        ExecutionResult::Success {
            output: output.into(),
        }
    }

    pub fn failed(reason: FailureReason) -> Self {
        ExecutionResult::Failure { reason }
    }

    /// Convenience wrapper for a plain execution-failure message.
    pub fn failure(message: impl Into<String>) -> Self {
        ExecutionResult::Failure {
            reason: FailureReason::ExecutionFailed {
                message: message.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ExecutionResult::Failure { .. })
    }

    /// Get the output string (for success) or the failure message.
    pub fn output(&self) -> String {
        match self {
            ExecutionResult::Success { output } => output.clone(),
            ExecutionResult::Failure { reason } => reason.message(),
        }
    }

    pub fn failure_reason(&self) -> Option<&FailureReason> {
        match self {
            ExecutionResult::Success { .. } => None,
            ExecutionResult::Failure { reason } => Some(reason),
        }
    }
}

/// Trait defining an executable capability.
///
/// Capabilities are pure functions of their bound arguments plus whatever
/// collaborator they hold (the catalog, typically); none of them mutates
/// conversational memory directly.
pub trait Capability: Send + Sync {
    /// The unique name the loop dispatches on.
    fn name(&self) -> &str;

    /// Human-readable description for the capability catalog.
    fn description(&self) -> &str {
        ""
    }

    /// The positional argument schema bound at the dispatch boundary.
    fn schema(&self) -> CapabilitySchema;

    /// Execute with arguments already validated against [`Capability::schema`].
    fn invoke(&self, args: &[ArgValue]) -> ExecutionResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ParamSpec;

    struct EchoCapability;

    impl Capability for EchoCapability {
        fn name(&self) -> &str {
            "echo"
        }

        fn schema(&self) -> CapabilitySchema {
            CapabilitySchema::new(vec![ParamSpec::text("text")])
        }

        fn invoke(&self, args: &[ArgValue]) -> ExecutionResult {
            ExecutionResult::success(format!("Echo: {}", args[0].as_text()))
        }
    }

    #[test]
    fn standard_names_round_trip() {
        for capability in StandardCapability::all() {
            assert_eq!(
                StandardCapability::from_name(capability.name()),
                Some(*capability)
            );
        }
        assert_eq!(StandardCapability::from_name("teleport_book"), None);
    }

    #[test]
    fn dispatch_recognizes_standard_and_custom() {
        match CapabilityDispatch::from_name("search_books").unwrap() {
            CapabilityDispatch::Standard(StandardCapability::SearchBooks) => {}
            other => panic!("expected standard dispatch, got {other:?}"),
        }

        match CapabilityDispatch::from_name("shelf_audit").unwrap() {
            CapabilityDispatch::Custom(id) => assert_eq!(id.as_str(), "shelf_audit"),
            other => panic!("expected custom dispatch, got {other:?}"),
        }
    }

    #[test]
    fn dispatch_rejects_invalid_names() {
        assert!(CapabilityDispatch::from_name("no spaces allowed").is_err());
        assert!(CapabilityDispatch::from_name("").is_err());
    }

    #[test]
    fn capability_invokes_with_bound_args() {
        let capability = EchoCapability;
        let args = capability.schema().bind("hello").unwrap();
        let result = capability.invoke(&args);
        assert!(result.is_success());
        assert_eq!(result.output(), "Echo: hello");
    }

    #[test]
    fn failure_reason_messages() {
        let result = ExecutionResult::failed(FailureReason::NotFound {
            resource: "book 'Dune'".to_string(),
        });
        assert!(result.is_failure());
        assert_eq!(result.output(), "Not found: book 'Dune'");
    }
}
