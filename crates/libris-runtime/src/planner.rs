//! Objective planning
//!
//! One model call, no tool execution: the model is asked for a numbered
//! breakdown of an objective and the parser keeps only the lines that look
//! like steps.

use crate::parser::OutputParser;
use libris_core::{ModelClient, ModelError};
use std::sync::Arc;

/// Turns an objective into an ordered list of step strings.
pub struct Planner {
    model: Arc<dyn ModelClient>,
    parser: OutputParser,
}

impl Planner {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self {
            model,
            parser: OutputParser::new(),
        }
    }

    /// Ask the model for a plan. Lines that are neither numbered nor
    /// bulleted are dropped; an empty model output yields an empty plan.
    pub fn plan(&self, objective: &str) -> Result<Vec<String>, ModelError> {
        let prompt = format!(
            "Objective: {objective}\n\n\
             Break this objective down into specific, ordered steps.\n\
             Each step must be one concrete action.\n\
             Format: numbered list."
        );
        let output = self.model.complete(&prompt)?;
        Ok(self.parser.parse_plan(&output))
    }
}
