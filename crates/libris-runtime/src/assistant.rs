//! The Assistant facade
//!
//! Composes the admission gate, per-session memory, the reasoning loop,
//! the capability registry, and the trace collector into one `Send + Sync`
//! context object. `chat` is total: every internal failure degrades to a
//! textual answer.

use crate::loop_runner::{LoopConfig, ReasoningLoop};
use crate::planner::Planner;
use libris_core::{
    AdmissionGate, GateError, MemoryError, ModelClient, ModelError, RateLimitConfig, SessionId,
    TraceId, ValidationConfig,
};
use libris_memory::{
    FileMemoryStore, KnowledgeItem, KnowledgeStore, MemoryConfig, ProfileKey, Role, SessionStore,
};
use libris_observability::{
    CollectorConfig, Component, ErrorKind, SummaryStats, TraceCollector, TraceStatus,
};
use libris_tools::{CapabilityInfo, CapabilityRegistry};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

const SAFETY_ANSWER: &str =
    "I can't process that request. Please rephrase your question and try again.";
const MODEL_FAILURE_ANSWER: &str =
    "I'm sorry, I couldn't process your request right now. Please try again in a moment.";

/// Top-level configuration for the assistant.
#[derive(Debug, Clone, Default)]
pub struct AssistantConfig {
    pub loop_config: LoopConfig,
    pub memory: MemoryConfig,
    pub validation: ValidationConfig,
    pub rate_limit: RateLimitConfig,
    pub collector: CollectorConfig,
}

/// Read-only view of one session's memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryOverview {
    pub turn_count: usize,
    pub summary: String,
    pub profile: BTreeMap<ProfileKey, String>,
    pub recent_context: String,
}

/// The conversational library assistant.
pub struct Assistant {
    model: Arc<dyn ModelClient>,
    registry: Arc<dyn CapabilityRegistry + Send + Sync>,
    gate: AdmissionGate,
    sessions: SessionStore,
    knowledge: Mutex<KnowledgeStore>,
    collector: Arc<TraceCollector>,
    reasoning: ReasoningLoop,
    planner: Planner,
}

impl Assistant {
    pub fn new(
        model: Arc<dyn ModelClient>,
        registry: Arc<dyn CapabilityRegistry + Send + Sync>,
        config: AssistantConfig,
    ) -> Self {
        let collector = Arc::new(TraceCollector::new(config.collector));
        Self {
            reasoning: ReasoningLoop::new(
                Arc::clone(&model),
                Arc::clone(&collector),
                config.loop_config,
            ),
            planner: Planner::new(Arc::clone(&model)),
            gate: AdmissionGate::new(config.validation, config.rate_limit),
            sessions: SessionStore::new(config.memory),
            knowledge: Mutex::new(KnowledgeStore::new()),
            collector,
            model,
            registry,
        }
    }

    /// Answer one question within a session.
    ///
    /// Always returns text: gate rejections, model failures, and tool
    /// problems all degrade to an answer rather than an error. The raw
    /// question goes to the model untouched; only what is logged or stored
    /// in metrics is sanitized.
    pub fn chat(&self, question: &str, session_id: &SessionId) -> String {
        let trace_id = TraceId::generate();

        let gate_started = Instant::now();
        if let Err(e) = self.gate.admit(session_id.as_str(), question) {
            return self.reject(&trace_id, e);
        }

        let sanitized_question = self.gate.sanitize(question);
        self.collector
            .start_request(trace_id.clone(), &sanitized_question, session_id.clone());
        self.collector
            .record_component(&trace_id, Component::Gate, gate_started.elapsed());

        // Extract profile facts and render context under a short lock;
        // the lock is released before the model is called.
        let memory = self.sessions.session(session_id);
        let memory_started = Instant::now();
        let context = {
            let mut memory = memory
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            memory.observe_user_message(question);
            memory.build_context()
        };
        self.collector
            .record_component(&trace_id, Component::Memory, memory_started.elapsed());

        let prompt = self.build_prompt(&context, question);
        let (answer, status) = match self.reasoning.run(&trace_id, &*self.registry, &prompt) {
            Ok(answer) => (answer, TraceStatus::Success),
            Err(e) => {
                tracing::warn!(trace = %trace_id, error = %e, "Model call failed");
                self.collector.record_error(
                    &trace_id,
                    ErrorKind::Model,
                    &e.to_string(),
                    Component::ModelCall,
                );
                (MODEL_FAILURE_ANSWER.to_string(), TraceStatus::Error)
            }
        };

        {
            let mut memory = memory
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            memory.append_turn(Role::User, question);
            memory.append_turn(Role::Assistant, answer.as_str());
        }

        self.collector
            .end_request(&trace_id, &self.gate.sanitize(&answer), status);
        answer
    }

    fn reject(&self, trace_id: &TraceId, error: GateError) -> String {
        match error {
            GateError::ValidationRejected { category } => {
                self.collector.record_error(
                    trace_id,
                    ErrorKind::Validation,
                    category.as_str(),
                    Component::Gate,
                );
                SAFETY_ANSWER.to_string()
            }
            GateError::RateLimited { retry_after_secs } => {
                self.collector.record_error(
                    trace_id,
                    ErrorKind::RateLimit,
                    &format!("retry after {retry_after_secs}s"),
                    Component::Gate,
                );
                format!(
                    "You've made too many requests. Please try again in {retry_after_secs} seconds."
                )
            }
        }
    }

    fn build_prompt(&self, context: &str, question: &str) -> String {
        let mut tool_lines = String::new();
        for info in self.registry.capability_catalog() {
            tool_lines.push_str(&format!(
                "- {} {}: {}\n",
                info.name, info.signature, info.description
            ));
        }

        let context_block = if context.is_empty() {
            "This is the start of the conversation.".to_string()
        } else {
            context.to_string()
        };

        format!(
            "You are Libris, an intelligent library assistant with conversational memory.\n\
             You help users search the catalog, manage loans, compute late fees, look up\n\
             policies, and reserve books.\n\n\
             Available tools:\n{tool_lines}\n\
             To use a tool, respond in this exact format:\n\
             Thought: [your reasoning about what to do]\n\
             Action: [tool_name]\n\
             Action Input: [comma-separated parameters]\n\n\
             When you have enough information, respond:\n\
             Final Answer: [your answer to the user]\n\n\
             Context from earlier in the conversation:\n{context_block}\n\n\
             User question: {question}"
        )
    }

    /// Break an objective into ordered steps. One model call, no tools.
    pub fn plan(&self, objective: &str) -> Result<Vec<String>, ModelError> {
        self.planner.plan(objective)
    }

    /// Aggregate metrics over the completed-request buffer.
    pub fn metrics_snapshot(&self) -> SummaryStats {
        self.collector.summary_stats()
    }

    /// Reset a session's turns and summary. Profile facts survive.
    pub fn clear_memory(&self, session_id: &SessionId) {
        let memory = self.sessions.session(session_id);
        memory
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    /// Drop a session's extracted profile facts.
    pub fn clear_profile(&self, session_id: &SessionId) {
        let memory = self.sessions.session(session_id);
        memory
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear_profile();
    }

    /// Read-only inspection of one session's memory.
    pub fn memory_overview(&self, session_id: &SessionId) -> MemoryOverview {
        let memory = self.sessions.session(session_id);
        let memory = memory
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        MemoryOverview {
            turn_count: memory.turn_count(),
            summary: memory.summary().to_string(),
            profile: memory.profile().clone(),
            recent_context: memory.build_context(),
        }
    }

    /// Describe every registered capability.
    pub fn capability_catalog(&self) -> Vec<CapabilityInfo> {
        self.registry.capability_catalog()
    }

    /// Store a fact in the knowledge store.
    pub fn remember_fact(&self, content: &str, metadata: BTreeMap<String, String>) {
        self.knowledge
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .store(content, metadata);
    }

    /// Retrieve the facts most relevant to a query by lexical overlap.
    pub fn recall_facts(&self, query: &str, top_k: usize) -> Vec<KnowledgeItem> {
        self.knowledge
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .retrieve_relevant(query, top_k)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Persist one session's memory snapshot to a JSON file.
    pub fn save_session(&self, session_id: &SessionId, path: &Path) -> Result<(), MemoryError> {
        let memory = self.sessions.session(session_id);
        let snapshot = memory
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .snapshot();
        FileMemoryStore::new(path).save(&snapshot)
    }

    /// Restore one session's memory from a JSON file. A missing or corrupt
    /// file leaves the session empty.
    pub fn load_session(&self, session_id: &SessionId, path: &Path) -> Result<(), MemoryError> {
        let snapshot = FileMemoryStore::new(path).load()?;
        let memory = self.sessions.session(session_id);
        memory
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .restore(snapshot);
        Ok(())
    }

    /// Persist the metrics buffers to a JSON file.
    pub fn save_metrics(
        &self,
        path: &Path,
    ) -> Result<(), libris_observability::PersistError> {
        self.collector.save_to_file(path)
    }

    /// The shared collector, for callers that record their own traces.
    pub fn collector(&self) -> &Arc<TraceCollector> {
        &self.collector
    }

    /// The model client the assistant was built with.
    pub fn model(&self) -> &Arc<dyn ModelClient> {
        &self.model
    }
}
