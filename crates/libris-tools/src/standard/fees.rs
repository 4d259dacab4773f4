use libris_core::{
    ArgValue, Capability, CapabilitySchema, ExecutionResult, FailureReason, ParamSpec,
    StandardCapability,
};

/// `compute_late_fee(days_overdue, per_diem = 500)`: linear fee, zero or
/// negative days means nothing is owed.
pub struct ComputeLateFeeCapability;

impl Capability for ComputeLateFeeCapability {
    fn name(&self) -> &str {
        StandardCapability::ComputeLateFee.name()
    }

    fn description(&self) -> &str {
        StandardCapability::ComputeLateFee.description()
    }

    fn schema(&self) -> CapabilitySchema {
        CapabilitySchema::new(vec![
            ParamSpec::integer("days_overdue"),
            ParamSpec::integer_with_default("per_diem", 500),
        ])
    }

    fn invoke(&self, args: &[ArgValue]) -> ExecutionResult {
        let Some(days) = args[0].as_integer() else {
            return ExecutionResult::failed(FailureReason::InvalidArguments {
                message: format!("days overdue must be a number, got '{}'", args[0].as_text()),
            });
        };
        let Some(per_diem) = args[1].as_integer() else {
            return ExecutionResult::failed(FailureReason::InvalidArguments {
                message: format!("fee per day must be a number, got '{}'", args[1].as_text()),
            });
        };

        if days <= 0 {
            return ExecutionResult::success("No fee applies.");
        }

        let total = days.saturating_mul(per_diem);
        ExecutionResult::success(format!(
            "Late fee calculation:\n- Days overdue: {days}\n- Fee per day: ${per_diem}\n- Total due: ${total}"
        ))
    }
}
