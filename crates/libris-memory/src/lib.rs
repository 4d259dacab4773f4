//! Conversational memory for the Libris runtime
//!
//! Per-session bounded turn history with rolling summaries, profile fact
//! extraction from user messages, a lazily-populated session registry, an
//! append-only knowledge store, and JSON file persistence for snapshots.

pub mod conversation;
pub mod file_store;
pub mod knowledge;
pub mod profile;
pub mod session;
pub mod summary;

pub use conversation::{ConversationMemory, ConversationTurn, MemoryConfig, MemorySnapshot, Role};
pub use file_store::FileMemoryStore;
pub use knowledge::{KnowledgeItem, KnowledgeStore};
pub use profile::{ProfileExtractor, ProfileKey};
pub use session::SessionStore;
