use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use acolyt_gateway::discord::start_discord_bot;
use acolyt_gateway::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration first so `[logging].level` can seed the filter
    let config = acolyt_core::Config::load()?;

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.settings.logging.level.clone().into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Configuration loaded (completion model: {}, embedding model: {})",
        config.settings.completion.model,
        config.knowledge_settings().embedding_model
    );

    // Create shared application state
    let state = Arc::new(AppState::from_config(&config).await?);
    info!(
        chunks = state.knowledge.snapshot().len(),
        notes = %state.knowledge.notes_path().display(),
        "Knowledge store ready"
    );

    let refresh_task = state.start_refresh_runner().await;

    // Start Discord bot if enabled and token is present
    let discord_task = if config.discord_enabled() {
        match start_discord_bot(config.discord_bot_token(), Arc::clone(&state)).await? {
            Some(mut client) => {
                Some(tokio::spawn(async move {
                    if let Err(e) = client.start().await {
                        error!("Discord client error: {}", e);
                    }
                }))
            }
            None => {
                info!("Discord bot not started");
                None
            }
        }
    } else {
        info!("Discord bot not configured (set DISCORD_BOT_TOKEN and enable in config to enable)");
        None
    };

    match discord_task {
        Some(mut task) => {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    result?;
                    info!("Shutdown requested");
                    task.abort();
                }
                _ = &mut task => {
                    error!("Discord client stopped");
                }
            }
        }
        None => {
            tokio::signal::ctrl_c().await?;
            info!("Shutdown requested");
        }
    }

    refresh_task.abort();
    Ok(())
}
