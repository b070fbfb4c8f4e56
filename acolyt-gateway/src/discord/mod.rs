//! Discord transport: message events, slash commands and reply delivery.

mod bot;
mod interactions;
mod send;

use std::sync::Arc;

use serenity::prelude::*;
use tracing::info;

use crate::state::AppState;

pub use bot::{Bot, strip_bot_mention};
pub use interactions::format_status;
pub use send::{DISCORD_MESSAGE_LIMIT, split_discord_message};

/// Guild messages (with content) for training capture and mentions, plus DMs.
fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
}

/// Discord-related errors
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("Failed to create Discord client: {0}")]
    ClientError(#[from] serenity::Error),
}

/// Build the Discord client, or `None` when no usable token is configured.
pub async fn start_discord_bot(
    token: Option<&str>,
    state: Arc<AppState>,
) -> Result<Option<Client>, DiscordError> {
    let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
        info!("No DISCORD_BOT_TOKEN set, skipping Discord bot");
        return Ok(None);
    };

    let training_channel = state.training_channel_id;
    let client = Client::builder(token, intents())
        .event_handler(Bot::new(state))
        .await?;
    info!(?training_channel, "Discord client created");
    Ok(Some(client))
}
