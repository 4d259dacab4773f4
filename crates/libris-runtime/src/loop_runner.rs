//! The ReAct-style reasoning loop
//!
//! Alternates model calls with tool dispatch until the model declares a
//! final answer, the output stops being parsable, or the iteration bound
//! is reached. Tool problems become observations the model can react to;
//! only a model-client failure aborts the loop.

use crate::parser::{OutputParser, ParsedModelOutput};
use libris_core::{CapabilityCall, ModelClient, ModelError, PiiRedactor, TraceId};
use libris_observability::{Component, ErrorKind, ToolInvocationRecord, TraceCollector};
use libris_tools::CapabilityRegistry;
use std::sync::Arc;
use std::time::Instant;

const NEXT_STEP_PROMPT: &str = "Let's think about the next step based on this observation.";

/// Loop bounds.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub max_iterations: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self { max_iterations: 5 }
    }
}

/// Runs the reasoning loop for one request.
///
/// Holds no locks of its own; the collector synchronizes internally and is
/// never locked across a model call.
pub struct ReasoningLoop {
    model: Arc<dyn ModelClient>,
    parser: OutputParser,
    redactor: PiiRedactor,
    collector: Arc<TraceCollector>,
    config: LoopConfig,
}

impl ReasoningLoop {
    pub fn new(
        model: Arc<dyn ModelClient>,
        collector: Arc<TraceCollector>,
        config: LoopConfig,
    ) -> Self {
        Self {
            model,
            parser: OutputParser::new(),
            redactor: PiiRedactor::new(),
            collector,
            config,
        }
    }

    /// Run the loop over an initial prompt, recording timings and tool
    /// invocations against `trace_id`.
    ///
    /// Returns the final answer text, or the last raw model output when
    /// the iteration bound is exhausted. A model-client error propagates.
    pub fn run(
        &self,
        trace_id: &TraceId,
        registry: &dyn CapabilityRegistry,
        initial_prompt: &str,
    ) -> Result<String, ModelError> {
        let mut prompt = initial_prompt.to_string();
        let mut last_output = String::new();

        for iteration in 0..self.config.max_iterations {
            let model_started = Instant::now();
            let output = self.model.complete(&prompt)?;
            self.collector
                .record_component(trace_id, Component::ModelCall, model_started.elapsed());
            last_output = output.clone();

            match self.parser.parse(&output) {
                ParsedModelOutput::FinalAnswer(answer) => {
                    tracing::debug!(iteration, "Loop terminated with final answer");
                    return Ok(answer);
                }
                ParsedModelOutput::Unparsable(raw) => {
                    tracing::debug!(iteration, "Loop terminated on unparsable output");
                    return Ok(self.parser.filter_structural(&raw));
                }
                ParsedModelOutput::Action { name, input } => {
                    let observation = self.dispatch(trace_id, registry, &name, &input);
                    prompt.push_str(&format!("\n\nObservation: {observation}"));
                    prompt.push_str(&format!("\n\n{NEXT_STEP_PROMPT}"));
                }
            }
        }

        tracing::debug!(
            max_iterations = self.config.max_iterations,
            "Loop exhausted its iteration bound"
        );
        Ok(last_output)
    }

    /// Execute one tool call, converting every dispatch problem into an
    /// observation string.
    fn dispatch(
        &self,
        trace_id: &TraceId,
        registry: &dyn CapabilityRegistry,
        name: &str,
        input: &str,
    ) -> String {
        let call = match CapabilityCall::new(name, input) {
            Ok(call) => call,
            Err(_) => {
                self.collector.record_error(
                    trace_id,
                    ErrorKind::Dispatch,
                    &format!("invalid capability name '{name}'"),
                    Component::CapabilityExecution,
                );
                return format!("Tool not found: '{name}'");
            }
        };

        let started = Instant::now();
        let Some(result) = registry.dispatch(call) else {
            self.collector.record_error(
                trace_id,
                ErrorKind::Dispatch,
                &format!("unknown capability '{name}'"),
                Component::CapabilityExecution,
            );
            return format!("Tool not found: '{name}'");
        };
        let latency = started.elapsed();

        let observation = match &result {
            libris_core::ExecutionResult::Success { output } => output.clone(),
            libris_core::ExecutionResult::Failure { reason } => {
                self.collector.record_error(
                    trace_id,
                    ErrorKind::Capability,
                    &reason.message(),
                    Component::CapabilityExecution,
                );
                format!("Error executing tool {name}: {}", reason.message())
            }
        };

        // The record is stored, so personal data must not survive into it;
        // the observation returned to the model stays raw.
        self.collector.record_tool(
            trace_id,
            ToolInvocationRecord::new(
                name,
                latency,
                result.is_success(),
                &self.redactor.redact(input),
                &self.redactor.redact(&observation),
            ),
        );
        self.collector
            .record_component(trace_id, Component::CapabilityExecution, latency);

        observation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libris_core::SessionId;
    use libris_observability::TraceStatus;
    use libris_testing::MockModelClient;
    use libris_tools::{InMemoryCapabilityRegistry, InMemoryCatalog};

    fn registry() -> InMemoryCapabilityRegistry {
        InMemoryCapabilityRegistry::with_standard_capabilities(Arc::new(InMemoryCatalog::seeded()))
    }

    fn run_loop(model: MockModelClient) -> (String, Arc<TraceCollector>, Arc<MockModelClient>) {
        let model = Arc::new(model);
        let collector = Arc::new(TraceCollector::default());
        let runner = ReasoningLoop::new(
            Arc::clone(&model) as Arc<dyn ModelClient>,
            Arc::clone(&collector),
            LoopConfig::default(),
        );

        let trace_id = TraceId::generate();
        collector.start_request(
            trace_id.clone(),
            "question",
            SessionId::parse("test-session").unwrap(),
        );
        let answer = runner.run(&trace_id, &registry(), "initial prompt").unwrap();
        collector.end_request(&trace_id, &answer, TraceStatus::Success);
        (answer, collector, model)
    }

    #[test]
    fn final_answer_terminates_immediately() {
        let model = MockModelClient::with_responses(["Final Answer: Clean Code is available."]);
        let (answer, _, model) = run_loop(model);
        assert_eq!(answer, "Clean Code is available.");
        assert_eq!(model.call_count(), 1);
    }

    #[test]
    fn tool_observation_feeds_the_next_prompt() {
        let model = MockModelClient::with_responses([
            "Thought: check the fee.\nAction: compute_late_fee\nAction Input: 5, 500",
            "Final Answer: You owe $2500.",
        ]);
        let (answer, collector, model) = run_loop(model);
        assert_eq!(answer, "You owe $2500.");
        assert!(model.was_prompted_with("Observation: Late fee calculation"));
        assert!(model.was_prompted_with(NEXT_STEP_PROMPT));

        let trace = &collector.completed_traces()[0];
        assert_eq!(trace.successful_tool_invocations(), 1);
    }

    #[test]
    fn never_final_script_runs_exactly_max_iterations() {
        let model = MockModelClient::new()
            .with_fallback("Thought: keep looking.\nAction: search_books\nAction Input: poetry");
        let (answer, _, model) = run_loop(model);
        assert_eq!(model.call_count(), LoopConfig::default().max_iterations);
        // Exhaustion returns the last raw output.
        assert!(answer.contains("Action: search_books"));
    }

    #[test]
    fn unknown_tool_becomes_an_observation_with_no_invocation_record() {
        let model = MockModelClient::with_responses([
            "Action: unknownTool\nAction Input: whatever",
            "Final Answer: done",
        ]);
        let (answer, collector, model) = run_loop(model);
        assert_eq!(answer, "done");
        assert!(model.was_prompted_with("Tool not found: 'unknownTool'"));

        let trace = &collector.completed_traces()[0];
        assert_eq!(trace.successful_tool_invocations(), 0);
        assert!(trace.tools_used.is_empty());
        assert_eq!(collector.errors().len(), 1);
    }

    #[test]
    fn capability_failure_becomes_an_error_observation() {
        let model = MockModelClient::with_responses([
            "Action: create_loan\nAction Input: u-1, No Such Book",
            "Final Answer: sorry, that book does not exist",
        ]);
        let (_, collector, model) = run_loop(model);
        assert!(model.was_prompted_with("Error executing tool create_loan:"));

        let trace = &collector.completed_traces()[0];
        assert_eq!(trace.tools_used.len(), 1);
        assert!(!trace.tools_used[0].success);
        assert_eq!(trace.successful_tool_invocations(), 0);
    }

    #[test]
    fn tool_records_store_redacted_input_and_output() {
        // A search miss echoes the term, so the address would reach both
        // record fields unredacted.
        let model = MockModelClient::with_responses([
            "Action: search_books\nAction Input: contact a@b.com",
            "Final Answer: nothing found",
        ]);
        let (_, collector, model) = run_loop(model);

        // The model still sees the raw observation.
        assert!(model.was_prompted_with("No books found for term: contact a@b.com"));

        let trace = &collector.completed_traces()[0];
        let record = &trace.tools_used[0];
        assert!(record.input.contains("[EMAIL_REDACTED]"));
        assert!(record.output.contains("[EMAIL_REDACTED]"));
        assert!(!record.input.contains("a@b.com"));
        assert!(!record.output.contains("a@b.com"));
    }

    #[test]
    fn unparsable_output_terminates_with_filtered_prose() {
        let model = MockModelClient::with_responses([
            "Thought: nothing to do here.\nI could not find any action to take.",
        ]);
        let (answer, _, model) = run_loop(model);
        assert_eq!(answer, "I could not find any action to take.");
        assert_eq!(model.call_count(), 1);
    }

    #[test]
    fn model_error_propagates() {
        let model = Arc::new(MockModelClient::with_results([Err(ModelError::Timeout(
            "model took too long".to_string(),
        ))]));
        let collector = Arc::new(TraceCollector::default());
        let runner = ReasoningLoop::new(
            Arc::clone(&model) as Arc<dyn ModelClient>,
            Arc::clone(&collector),
            LoopConfig::default(),
        );
        let trace_id = TraceId::generate();
        let err = runner.run(&trace_id, &registry(), "prompt").unwrap_err();
        assert_eq!(err, ModelError::Timeout("model took too long".to_string()));
    }

    #[test]
    fn every_iteration_records_a_model_call_timing() {
        let model = MockModelClient::with_responses([
            "Action: get_policies\nAction Input: fees",
            "Final Answer: $500 per day.",
        ]);
        let (_, collector, _) = run_loop(model);
        let trace = &collector.completed_traces()[0];
        let model_calls = trace
            .components
            .iter()
            .filter(|t| t.component == Component::ModelCall)
            .count();
        assert_eq!(model_calls, 2);
    }
}
