//! Handler for messages directed at the bot during a chat session.

use log::{debug, info};
use poise::serenity_prelude::{Context, Message as SerenityMessage, UserId};

use crate::bot::Data;
use crate::error::Result;

use super::{DirectedOutcome, NOT_CHATTING, THINKING, converse, directed_gate};

/// Strip bot mention tokens from the raw message content.
fn plain_text(content: &str) -> String {
    content
        .split_whitespace()
        .filter(|token| !(token.starts_with("<@") && token.ends_with('>')))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Handle a message that mentions the bot.
///
/// Users without an active session get a prompt to start one; nothing is
/// appended to history and no completion is requested for them.
pub async fn handle_directed_message(
    ctx: &Context,
    new_message: &SerenityMessage,
    data: &Data,
    bot_user_id: UserId,
) -> Result<()> {
    if !new_message.mentions_user_id(bot_user_id) || new_message.author.bot {
        return Ok(());
    }

    let user_id = new_message.author.id.to_string();
    if directed_gate(data.store(), &user_id).await == DirectedOutcome::NotChatting {
        new_message.reply(&ctx.http, NOT_CHATTING).await?;
        return Ok(());
    }

    info!(
        "Received message from {} in channel {}: {}",
        new_message.author.tag(),
        new_message.channel_id,
        new_message.content
    );

    if let Err(e) = new_message.channel_id.broadcast_typing(&ctx.http).await {
        debug!("Failed to broadcast typing indicator: {e}");
    }
    new_message.reply(&ctx.http, THINKING).await?;

    let text = plain_text(&new_message.content);
    let reply = converse(data, &user_id, &text).await;

    new_message.reply(&ctx.http, &reply).await?;
    info!(
        "Replied to {} in channel {}: {}",
        new_message.author.tag(),
        new_message.channel_id,
        reply
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::plain_text;

    #[test]
    fn strips_mention_tokens() {
        assert_eq!(plain_text("<@123456> hello there"), "hello there");
        assert_eq!(plain_text("hello <@!987> there"), "hello there");
    }

    #[test]
    fn normalizes_whitespace() {
        assert_eq!(plain_text("  just   words "), "just words");
    }

    #[test]
    fn mention_only_message_becomes_empty() {
        assert_eq!(plain_text("<@123456>"), "");
    }
}
