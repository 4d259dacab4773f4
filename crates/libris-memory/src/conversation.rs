//! Bounded conversational memory for one session
//!
//! A session's memory holds three things: a bounded turn buffer, a rolling
//! summary of folded-away turns, and a profile of identity facts extracted
//! from user messages. Turn history is ephemeral and clearable; profile
//! facts outlive `clear` unless dropped explicitly.

use crate::profile::{ProfileExtractor, ProfileKey};
use crate::summary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::VecDeque;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// The label used when rendering a turn into context.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// One immutable conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub timestamp: DateTime<Utc>,
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            role,
            content: content.into(),
        }
    }
}

/// Memory sizing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Hard cap on retained turns; oldest turns are dropped past it.
    pub max_history: usize,
    /// Turn count past which older turns fold into the summary.
    pub summary_threshold: usize,
    /// How many recent turns render into the context string.
    pub recent_turns: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_history: 50,
            summary_threshold: 20,
            recent_turns: 3,
        }
    }
}

/// The serializable state of one session's memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub turns: Vec<ConversationTurn>,
    pub summary: String,
    pub profile: BTreeMap<ProfileKey, String>,
}

/// Conversational memory for one session.
///
/// Not internally synchronized; the session store wraps each instance in
/// its own mutex so same-session writers are serialized.
pub struct ConversationMemory {
    config: MemoryConfig,
    turns: VecDeque<ConversationTurn>,
    summary: String,
    profile: BTreeMap<ProfileKey, String>,
    extractor: ProfileExtractor,
}

impl ConversationMemory {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            config,
            turns: VecDeque::new(),
            summary: String::new(),
            profile: BTreeMap::new(),
            extractor: ProfileExtractor::new(),
        }
    }

    /// Append one turn, then enforce the bounds: fold older turns into the
    /// summary past the summary threshold, drop the oldest past the hard
    /// cap.
    pub fn append_turn(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push_back(ConversationTurn::new(role, content));

        if self.turns.len() > self.config.summary_threshold {
            let fold_count = self.turns.len() - self.config.summary_threshold;
            let old: Vec<ConversationTurn> =
                self.turns.iter().take(fold_count).cloned().collect();
            if let Some(summary) = summary::summarize(&old) {
                self.summary = summary;
            }
        }

        while self.turns.len() > self.config.max_history {
            self.turns.pop_front();
        }
    }

    /// Run profile extraction over one raw user message.
    ///
    /// Last write wins per key. Never errors; messages that match nothing
    /// record nothing.
    pub fn observe_user_message(&mut self, message: &str) {
        for (key, value) in self.extractor.extract(message) {
            tracing::debug!(key = %key, "Extracted profile fact");
            self.profile.insert(key, value);
        }
    }

    /// Render the deterministic context string: profile block first (when
    /// non-empty), then the summary (when present), then the most recent
    /// turns as `"<Role>: <content>"` lines.
    pub fn build_context(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if !self.profile.is_empty() {
            parts.push("User profile:".to_string());
            for (key, value) in &self.profile {
                parts.push(format!("- {}: {}", key, value));
            }
        }

        if !self.summary.is_empty() {
            parts.push(self.summary.clone());
        }

        let recent: Vec<&ConversationTurn> = self
            .turns
            .iter()
            .rev()
            .take(self.config.recent_turns)
            .collect();
        if !recent.is_empty() {
            parts.push("Recent conversation:".to_string());
            for turn in recent.into_iter().rev() {
                parts.push(format!("{}: {}", turn.role.label(), turn.content));
            }
        }

        parts.join("\n")
    }

    /// Reset turns and summary. Identity facts persist; they go through
    /// [`ConversationMemory::clear_profile`] only.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.summary.clear();
    }

    /// Drop the extracted identity facts.
    pub fn clear_profile(&mut self) {
        self.profile.clear();
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn profile(&self) -> &BTreeMap<ProfileKey, String> {
        &self.profile
    }

    /// Capture the serializable state.
    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            turns: self.turns.iter().cloned().collect(),
            summary: self.summary.clone(),
            profile: self.profile.clone(),
        }
    }

    /// Replace the state from a snapshot, re-enforcing the bounds in case
    /// the snapshot was written under a larger configuration.
    pub fn restore(&mut self, snapshot: MemorySnapshot) {
        self.turns = snapshot.turns.into();
        self.summary = snapshot.summary;
        self.profile = snapshot.profile;
        while self.turns.len() > self.config.max_history {
            self.turns.pop_front();
        }
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}
