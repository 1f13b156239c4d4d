use std::env;

use log::{debug, error, info};

use crate::error::Result;

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
const DEFAULT_MODEL: &str = "deepseek-chat";
const DEFAULT_SYSTEM_PROMPT: &str = "I'm Nanami, a high school girl who loves sharks.";

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub system_prompt: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();

        let discord_token = env::var("DISCORD_TOKEN").map_err(|e| {
            error!("Failed to load DISCORD_TOKEN from environment: {e}");
            e
        })?;

        let api_key = env::var("DEEPSEEK_API_KEY").map_err(|e| {
            error!("Failed to load DEEPSEEK_API_KEY from environment: {e}");
            e
        })?;

        let base_url =
            env::var("DEEPSEEK_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = env::var("DEEPSEEK_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let system_prompt =
            env::var("SYSTEM_PROMPT").unwrap_or_else(|_| DEFAULT_SYSTEM_PROMPT.to_string());

        info!("Configuration loaded successfully");
        debug!("Discord token length: {} characters", discord_token.len());
        debug!("API key length: {} characters", api_key.len());
        debug!("Completion base URL: {base_url}");
        debug!("Completion model: {model}");
        debug!("System prompt length: {} characters", system_prompt.len());

        Ok(Self {
            discord_token,
            api_key,
            base_url,
            model,
            system_prompt,
        })
    }
}
