//! Availability, loan, and reservation capabilities

use crate::catalog::Catalog;
use chrono::{Duration, Utc};
use libris_core::{
    ArgValue, Capability, CapabilitySchema, ExecutionResult, FailureReason, ParamSpec,
    StandardCapability,
};
use std::sync::Arc;

/// `check_availability(title)`: exact case-insensitive title lookup.
pub struct CheckAvailabilityCapability {
    catalog: Arc<dyn Catalog>,
}

impl CheckAvailabilityCapability {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }
}

impl Capability for CheckAvailabilityCapability {
    fn name(&self) -> &str {
        StandardCapability::CheckAvailability.name()
    }

    fn description(&self) -> &str {
        StandardCapability::CheckAvailability.description()
    }

    fn schema(&self) -> CapabilitySchema {
        CapabilitySchema::new(vec![ParamSpec::text("title")])
    }

    fn invoke(&self, args: &[ArgValue]) -> ExecutionResult {
        let title = args[0].as_text();
        match self.catalog.find_title(&title) {
            Some(record) if record.available => ExecutionResult::success(format!(
                "The book '{}' is available for loan.",
                record.title
            )),
            Some(record) => ExecutionResult::success(format!(
                "The book '{}' is not available right now.",
                record.title
            )),
            None => ExecutionResult::failed(FailureReason::NotFound {
                resource: format!("book '{title}'"),
            }),
        }
    }
}

/// `create_loan(user_id, title, days = 14)`: validates availability, then
/// confirms with a due date of `now + days`.
pub struct CreateLoanCapability {
    catalog: Arc<dyn Catalog>,
}

impl CreateLoanCapability {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }
}

impl Capability for CreateLoanCapability {
    fn name(&self) -> &str {
        StandardCapability::CreateLoan.name()
    }

    fn description(&self) -> &str {
        StandardCapability::CreateLoan.description()
    }

    fn schema(&self) -> CapabilitySchema {
        CapabilitySchema::new(vec![
            ParamSpec::text("user_id"),
            ParamSpec::text("title"),
            ParamSpec::integer_with_default("days", 14),
        ])
    }

    fn invoke(&self, args: &[ArgValue]) -> ExecutionResult {
        let user_id = args[0].as_text();
        let title = args[1].as_text();
        let Some(days) = args[2].as_integer() else {
            return ExecutionResult::failed(FailureReason::InvalidArguments {
                message: format!("loan days must be a number, got '{}'", args[2].as_text()),
            });
        };
        if days <= 0 {
            return ExecutionResult::failed(FailureReason::InvalidArguments {
                message: format!("loan days must be positive, got {days}"),
            });
        }

        match self.catalog.find_title(&title) {
            Some(record) if record.available => {
                let due = Utc::now() + Duration::days(days);
                ExecutionResult::success(format!(
                    "Loan created:\n- Book: {}\n- User: {}\n- Due date: {}\n- Duration: {} days",
                    record.title,
                    user_id,
                    due.format("%Y-%m-%d"),
                    days
                ))
            }
            Some(record) => ExecutionResult::failed(FailureReason::ExecutionFailed {
                message: format!(
                    "Cannot create loan: the book '{}' is not available right now.",
                    record.title
                ),
            }),
            None => ExecutionResult::failed(FailureReason::NotFound {
                resource: format!("book '{title}'"),
            }),
        }
    }
}

/// `reserve_book(user_id, title)`: confirmation text for a pending
/// reservation. Placing a reservation on an available book is allowed; the
/// catalog backend owns queueing semantics.
pub struct ReserveBookCapability;

impl Capability for ReserveBookCapability {
    fn name(&self) -> &str {
        StandardCapability::ReserveBook.name()
    }

    fn description(&self) -> &str {
        StandardCapability::ReserveBook.description()
    }

    fn schema(&self) -> CapabilitySchema {
        CapabilitySchema::new(vec![ParamSpec::text("user_id"), ParamSpec::text("title")])
    }

    fn invoke(&self, args: &[ArgValue]) -> ExecutionResult {
        let user_id = args[0].as_text();
        let title = args[1].as_text();
        ExecutionResult::success(format!(
            "Reservation created:\n- Book: {title}\n- User: {user_id}\n- Status: pending\n- You will be notified when the book becomes available"
        ))
    }
}
