//! Discord bot core logic and event handling.

use std::error::Error as StdError;

use log::{debug, error, info};
use poise::{
    Framework, FrameworkOptions, builtins,
    serenity_prelude::{ClientBuilder, Context, FullEvent, GatewayIntents},
};

use crate::chat::commands;
use crate::chat::handler::handle_directed_message;
use crate::completion::CompletionClient;
use crate::config::Config;
use crate::error::Result;
use crate::session::SessionStore;

type EventResult = std::result::Result<(), Box<dyn StdError + Send + Sync>>;

/// Shared state handed to every command and event handler.
pub struct Data {
    store: SessionStore,
    completion: CompletionClient,
}

impl Data {
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn completion(&self) -> &CompletionClient {
        &self.completion
    }
}

/// Run the Discord bot.
pub async fn run() -> Result<()> {
    info!("Initializing bot");
    let config = Config::from_env()?;

    debug!("Initializing completion client");
    let completion = CompletionClient::new(
        config.api_key.clone(),
        config.base_url.clone(),
        config.model.clone(),
    );
    let store = SessionStore::new(config.system_prompt.clone());

    debug!("Setting up gateway intents");
    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    let discord_token = config.discord_token.clone();

    debug!("Building framework");
    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands: vec![
                commands::chat(),
                commands::endchat(),
                commands::clearhistory(),
            ],
            event_handler: |ctx, event, _framework, data| Box::pin(event_handler(ctx, event, data)),
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready and connected to Discord");
                debug!("Registering commands globally");
                builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Commands registered successfully");
                Ok(Data { store, completion })
            })
        })
        .build();

    debug!("Creating Discord client");
    let mut client = ClientBuilder::new(discord_token, intents)
        .framework(framework)
        .await?;

    info!("Starting Discord client");

    tokio::select! {
        result = client.start() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down...");
        }
    }

    Ok(())
}

async fn event_handler(ctx: &Context, event: &FullEvent, data: &Data) -> EventResult {
    if let FullEvent::Message { new_message } = event {
        let bot_user_id = ctx.cache.current_user().id;
        if let Err(e) = handle_directed_message(ctx, new_message, data, bot_user_id).await {
            error!(
                "Error handling message from {}: {e}",
                new_message.author.tag()
            );
            if let Err(reply_err) = new_message.reply(&ctx.http, e.user_message()).await {
                debug!("Failed to send error reply: {reply_err}");
            }
        }
    }
    Ok(())
}
