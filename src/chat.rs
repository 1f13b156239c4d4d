//! Chat session commands and the directed-message conversation flow.

pub mod commands;
pub mod handler;

use log::error;

use crate::bot::Data;
use crate::error::BotError;
use crate::session::SessionStore;
use crate::types::MessageRole;

pub(crate) const ALREADY_CHATTING: &str = "You're already in a chat, you can just talk to me.";
pub(crate) const CHAT_STARTED: &str =
    "Chat started! Talk to me by mentioning me, and use /endchat when you're done.";
pub(crate) const NOT_CHATTING: &str = "We're not in a chat right now. Use /chat to start one.";
pub(crate) const CHAT_ENDED: &str = "Chat ended!";
pub(crate) const NO_ACTIVE_CHAT: &str = "You don't have an active chat.";
pub(crate) const HISTORY_CLEARED: &str = "Chat history cleared!";
pub(crate) const NO_HISTORY: &str = "You have no chat history to clear.";
pub(crate) const THINKING: &str = "Thinking, give me a moment...";

/// Gate decision for the directed-message path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DirectedOutcome {
    /// Active session; forward to the completion flow.
    Forward,
    /// No active session; prompt the user to start one.
    NotChatting,
}

/// Decide the freeform path for a user.
///
/// Inactive users are turned away before anything touches their history or
/// reaches the completion client.
pub(crate) async fn directed_gate(store: &SessionStore, user_id: &str) -> DirectedOutcome {
    if store.is_active(user_id).await {
        DirectedOutcome::Forward
    } else {
        DirectedOutcome::NotChatting
    }
}

/// Failure policy for completion requests: the error text becomes the reply.
pub(crate) fn failure_reply(err: &BotError) -> String {
    format!("Something went wrong with the request: {err}")
}

/// Append the user's message, request a completion over the full history, and
/// append the reply.
///
/// Holds the per-user completion guard across the whole sequence so a second
/// message from the same user waits instead of interleaving appends.
pub(crate) async fn converse(data: &Data, user_id: &str, text: &str) -> String {
    let guard = data.store().completion_guard(user_id).await;
    let _in_flight = guard.lock().await;

    data.store().push(user_id, MessageRole::User, text).await;
    let history = data.store().history(user_id).await;

    let reply = match data.completion().complete(&history).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Completion request failed for user {user_id}: {e}");
            failure_reply(&e)
        }
    };

    data.store()
        .push(user_id, MessageRole::Assistant, reply.as_str())
        .await;
    reply
}
