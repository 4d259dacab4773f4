//! Model output parser
//!
//! Isolates the structural reading of raw model text from the loop that
//! acts on it. The parser recognizes the final-answer marker and the
//! action/action-input markers; everything else is unparsable prose the
//! loop degrades gracefully on.

use regex::Regex;

const FINAL_ANSWER_MARKER: &str = "Final Answer:";
const STRUCTURAL_PREFIXES: [&str; 4] = ["Thought:", "Action:", "Action Input:", "Observation:"];

/// The structural reading of one model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedModelOutput {
    /// The output declares a final answer; the loop terminates with it.
    FinalAnswer(String),
    /// The output requests one tool call. Only the first action marker in
    /// an output is honored.
    Action { name: String, input: String },
    /// No marker matched; the raw output carried back for degraded
    /// termination.
    Unparsable(String),
}

/// Compiled patterns for reading model output.
pub struct OutputParser {
    action: Regex,
    action_input: Regex,
    numbered_step: Regex,
}

impl OutputParser {
    pub fn new() -> Self {
        Self {
            action: Regex::new(r"Action:\s*(\w+)").expect("action pattern is valid"),
            action_input: Regex::new(r"Action Input:\s*(.+)").expect("input pattern is valid"),
            numbered_step: Regex::new(r"^\d+[.)]\s*").expect("step pattern is valid"),
        }
    }

    /// Read one model output.
    ///
    /// A final-answer marker wins over any action in the same output; the
    /// answer is everything after the LAST marker occurrence, trimmed.
    pub fn parse(&self, output: &str) -> ParsedModelOutput {
        if let Some(at) = output.rfind(FINAL_ANSWER_MARKER) {
            let answer = output[at + FINAL_ANSWER_MARKER.len()..].trim();
            return ParsedModelOutput::FinalAnswer(answer.to_string());
        }

        if let Some(captures) = self.action.captures(output) {
            let name = captures[1].to_string();
            let input = self
                .action_input
                .captures(output)
                .map(|c| c[1].trim().to_string())
                .unwrap_or_default();
            return ParsedModelOutput::Action { name, input };
        }

        ParsedModelOutput::Unparsable(output.to_string())
    }

    /// Strip structural lines out of an unparsable output, keeping the
    /// prose. When nothing survives, the raw output comes back verbatim.
    pub fn filter_structural(&self, raw: &str) -> String {
        let kept: Vec<&str> = raw
            .lines()
            .filter(|line| {
                let line = line.trim_start();
                !line.is_empty()
                    && !STRUCTURAL_PREFIXES
                        .iter()
                        .any(|prefix| line.starts_with(prefix))
            })
            .collect();
        if kept.is_empty() {
            raw.to_string()
        } else {
            kept.join("\n").trim().to_string()
        }
    }

    /// Extract plan steps: numbered lines (`1.` / `1)`) and `-`/`*`
    /// bullets; everything else is dropped.
    pub fn parse_plan(&self, output: &str) -> Vec<String> {
        output
            .lines()
            .map(str::trim)
            .filter(|line| {
                self.numbered_step.is_match(line)
                    || line.starts_with("- ")
                    || line.starts_with("* ")
            })
            .map(str::to_string)
            .collect()
    }
}

impl Default for OutputParser {
    fn default() -> Self {
        Self::new()
    }
}
