//! In-memory session and history tracking.
//!
//! State is process-lifetime only: nothing is persisted, and histories grow
//! without trimming until an explicit clear.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::debug;
use tokio::sync::Mutex;

use crate::completion::ChatMessage;
use crate::types::MessageRole;

/// Outcome of a session start attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyActive,
}

#[derive(Default)]
struct State {
    active: HashSet<String>,
    histories: HashMap<String, Vec<ChatMessage>>,
    guards: HashMap<String, Arc<Mutex<()>>>,
}

/// Owned store for the active session set and per-user histories.
///
/// All state lives behind one async mutex; handlers take short locks for each
/// operation and hold the per-user [`completion_guard`](Self::completion_guard)
/// across an append-complete-append sequence so two in-flight completions for
/// the same user cannot interleave their history appends.
pub struct SessionStore {
    system_prompt: String,
    state: Mutex<State>,
}

impl SessionStore {
    pub fn new(system_prompt: String) -> Self {
        Self {
            system_prompt,
            state: Mutex::new(State::default()),
        }
    }

    /// Mark the user active, seeding their history with the system prompt if
    /// they have none. An existing history is never reset.
    pub async fn start(&self, user_id: &str) -> StartOutcome {
        let mut state = self.state.lock().await;
        if !state.active.insert(user_id.to_string()) {
            return StartOutcome::AlreadyActive;
        }
        let seed = self.seed();
        state
            .histories
            .entry(user_id.to_string())
            .or_insert_with(|| vec![seed]);
        debug!("Session started for user {user_id}");
        StartOutcome::Started
    }

    /// Remove the user from the active set. History is left intact.
    pub async fn end(&self, user_id: &str) -> bool {
        let removed = self.state.lock().await.active.remove(user_id);
        if removed {
            debug!("Session ended for user {user_id}");
        }
        removed
    }

    /// Delete the user's history entry, whether or not they are active.
    ///
    /// The user's completion guard is dropped with it so departed users leave
    /// nothing behind in the store.
    pub async fn clear_history(&self, user_id: &str) -> bool {
        let mut state = self.state.lock().await;
        state.guards.remove(user_id);
        let removed = state.histories.remove(user_id).is_some();
        if removed {
            debug!("History cleared for user {user_id}");
        }
        removed
    }

    pub async fn is_active(&self, user_id: &str) -> bool {
        self.state.lock().await.active.contains(user_id)
    }

    /// Append one record to the user's history.
    ///
    /// A missing entry (cleared mid-session) is reseeded with the system
    /// prompt before the append.
    pub async fn push(&self, user_id: &str, role: MessageRole, content: impl Into<String>) {
        let mut state = self.state.lock().await;
        let seed = self.seed();
        state
            .histories
            .entry(user_id.to_string())
            .or_insert_with(|| vec![seed])
            .push(ChatMessage::new(role, content));
    }

    /// Cloned snapshot of the user's history for a completion request body.
    pub async fn history(&self, user_id: &str) -> Vec<ChatMessage> {
        self.state
            .lock()
            .await
            .histories
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Per-user guard serializing in-flight completions.
    pub async fn completion_guard(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut state = self.state.lock().await;
        state
            .guards
            .entry(user_id.to_string())
            .or_default()
            .clone()
    }

    fn seed(&self) -> ChatMessage {
        ChatMessage::new(MessageRole::System, self.system_prompt.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new("test prompt".to_string())
    }

    #[tokio::test]
    async fn first_start_seeds_one_system_record() {
        let store = store();
        assert_eq!(store.start("u1").await, StartOutcome::Started);
        assert!(store.is_active("u1").await);

        let history = store.history("u1").await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, MessageRole::System);
        assert_eq!(history[0].content, "test prompt");
    }

    #[tokio::test]
    async fn double_start_does_not_reset_history() {
        let store = store();
        store.start("u1").await;
        store.push("u1", MessageRole::User, "hi").await;

        assert_eq!(store.start("u1").await, StartOutcome::AlreadyActive);
        assert_eq!(store.history("u1").await.len(), 2);
    }

    #[tokio::test]
    async fn end_removes_from_active_set_but_keeps_history() {
        let store = store();
        store.start("u1").await;

        assert!(store.end("u1").await);
        assert!(!store.is_active("u1").await);
        assert_eq!(store.history("u1").await.len(), 1);

        // History must still be there for a later clear.
        assert!(store.clear_history("u1").await);
    }

    #[tokio::test]
    async fn end_without_session_reports_nothing() {
        let store = store();
        assert!(!store.end("u1").await);
    }

    #[tokio::test]
    async fn clear_history_is_idempotent() {
        let store = store();
        assert!(!store.clear_history("u1").await);

        store.start("u1").await;
        assert!(store.clear_history("u1").await);
        assert!(!store.clear_history("u1").await);
    }

    #[tokio::test]
    async fn push_reseeds_after_mid_session_clear() {
        let store = store();
        store.start("u1").await;
        store.clear_history("u1").await;

        store.push("u1", MessageRole::User, "hi").await;

        let history = store.history("u1").await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, MessageRole::System);
        assert_eq!(history[1].role, MessageRole::User);
    }

    #[tokio::test]
    async fn conversation_appends_in_order() {
        let store = store();
        store.start("u1").await;
        store.push("u1", MessageRole::User, "hi").await;
        store.push("u1", MessageRole::Assistant, "hello!").await;

        let roles: Vec<MessageRole> = store
            .history("u1")
            .await
            .iter()
            .map(|message| message.role)
            .collect();
        assert_eq!(
            roles,
            vec![MessageRole::System, MessageRole::User, MessageRole::Assistant]
        );
        assert_eq!(store.history("u1").await[2].content, "hello!");
    }

    #[tokio::test]
    async fn clear_history_drops_the_completion_guard() {
        let store = store();
        store.start("u1").await;
        let before = store.completion_guard("u1").await;

        store.clear_history("u1").await;

        let after = store.completion_guard("u1").await;
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[tokio::test]
    async fn completion_guard_is_shared_per_user() {
        let store = store();
        let first = store.completion_guard("u1").await;
        let second = store.completion_guard("u1").await;
        assert!(Arc::ptr_eq(&first, &second));

        let other = store.completion_guard("u2").await;
        assert!(!Arc::ptr_eq(&first, &other));
    }
}
