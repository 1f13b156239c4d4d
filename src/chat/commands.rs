//! Slash commands for managing chat sessions.

use std::error::Error as StdError;

use log::info;

use crate::bot::Data;
use crate::session::StartOutcome;

use super::{
    ALREADY_CHATTING, CHAT_ENDED, CHAT_STARTED, HISTORY_CLEARED, NO_ACTIVE_CHAT, NO_HISTORY,
    converse,
};

type Error = Box<dyn StdError + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

/// Start a chat session, optionally with an opening message.
#[poise::command(slash_command)]
pub async fn chat(
    ctx: Context<'_>,
    #[description = "Opening message for the conversation"] message: Option<String>,
) -> Result<(), Error> {
    let user_id = ctx.author().id.to_string();
    let data = ctx.data();

    if data.store().start(&user_id).await == StartOutcome::AlreadyActive {
        ctx.say(ALREADY_CHATTING).await?;
        return Ok(());
    }
    info!("Started chat session for user {user_id}");

    let opening = message
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty());

    match opening {
        Some(text) => {
            // The completion can easily outlive the interaction ack window.
            ctx.defer().await?;
            let reply = converse(data, &user_id, text).await;
            ctx.say(reply).await?;
        }
        None => {
            ctx.say(CHAT_STARTED).await?;
        }
    }
    Ok(())
}

/// End your chat session. History is kept around for a later /chat.
#[poise::command(slash_command)]
pub async fn endchat(ctx: Context<'_>) -> Result<(), Error> {
    let user_id = ctx.author().id.to_string();

    if ctx.data().store().end(&user_id).await {
        info!("Ended chat session for user {user_id}");
        ctx.say(CHAT_ENDED).await?;
    } else {
        ctx.say(NO_ACTIVE_CHAT).await?;
    }
    Ok(())
}

/// Delete your stored chat history.
#[poise::command(slash_command)]
pub async fn clearhistory(ctx: Context<'_>) -> Result<(), Error> {
    let user_id = ctx.author().id.to_string();

    if ctx.data().store().clear_history(&user_id).await {
        info!("Cleared chat history for user {user_id}");
        ctx.say(HISTORY_CLEARED).await?;
    } else {
        ctx.say(NO_HISTORY).await?;
    }
    Ok(())
}
