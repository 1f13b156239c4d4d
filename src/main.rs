#[tokio::main]
async fn main() -> deepchat::error::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("deepchat=info,serenity=warn"),
    )
    .init();
    log::info!("Starting deepchat Discord bot");

    match deepchat::run().await {
        Ok(()) => {
            log::info!("Bot shut down successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Bot encountered an error: {e}");
            Err(e)
        }
    }
}
