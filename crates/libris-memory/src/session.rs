//! Session registry mapping session identifiers to per-session memory
//!
//! The store holds one short-lived lock over the registry map; each
//! session's memory carries its own lock so concurrent sessions never
//! serialize against each other.

use crate::conversation::{ConversationMemory, MemoryConfig};
use libris_core::SessionId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Shared registry of per-session conversational memories.
///
/// Sessions are created lazily on first access, so lookups never fail.
pub struct SessionStore {
    config: MemoryConfig,
    sessions: Mutex<HashMap<SessionId, Arc<Mutex<ConversationMemory>>>>,
}

impl SessionStore {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the memory for a session, creating it on first use.
    pub fn session(&self, id: &SessionId) -> Arc<Mutex<ConversationMemory>> {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(sessions.entry(id.clone()).or_insert_with(|| {
            tracing::debug!(session = %id, "Created session memory");
            Arc::new(Mutex::new(ConversationMemory::new(self.config.clone())))
        }))
    }

    /// Drop a session entirely, including its profile.
    pub fn remove(&self, id: &SessionId) -> bool {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.remove(id).is_some()
    }

    pub fn session_count(&self) -> usize {
        let sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;

    #[test]
    fn sessions_are_created_lazily_and_reused() {
        let store = SessionStore::default();
        let id = SessionId::parse("session-a").unwrap();
        assert_eq!(store.session_count(), 0);

        {
            let memory = store.session(&id);
            memory.lock().unwrap().append_turn(Role::User, "hola");
        }
        assert_eq!(store.session_count(), 1);

        let memory = store.session(&id);
        assert_eq!(memory.lock().unwrap().turn_count(), 1);
    }

    #[test]
    fn sessions_are_isolated() {
        let store = SessionStore::default();
        let a = SessionId::parse("session-a").unwrap();
        let b = SessionId::parse("session-b").unwrap();

        store
            .session(&a)
            .lock()
            .unwrap()
            .append_turn(Role::User, "solo para a");

        assert_eq!(store.session(&b).lock().unwrap().turn_count(), 0);
        assert_eq!(store.session(&a).lock().unwrap().turn_count(), 1);
    }

    #[test]
    fn remove_drops_the_session() {
        let store = SessionStore::default();
        let id = SessionId::parse("session-a").unwrap();
        store
            .session(&id)
            .lock()
            .unwrap()
            .append_turn(Role::User, "hola");

        assert!(store.remove(&id));
        assert!(!store.remove(&id));
        assert_eq!(store.session(&id).lock().unwrap().turn_count(), 0);
    }

    #[test]
    fn concurrent_sessions_do_not_interfere() {
        let store = Arc::new(SessionStore::default());
        let mut handles = Vec::new();
        for n in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                let id = SessionId::parse(&format!("session-{n}")).unwrap();
                for _ in 0..20 {
                    store
                        .session(&id)
                        .lock()
                        .unwrap()
                        .append_turn(Role::User, "mensaje");
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.session_count(), 8);
        for n in 0..8 {
            let id = SessionId::parse(&format!("session-{n}")).unwrap();
            assert_eq!(store.session(&id).lock().unwrap().turn_count(), 20);
        }
    }
}
