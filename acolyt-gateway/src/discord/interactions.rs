use serenity::builder::{CreateInteractionResponse, CreateInteractionResponseMessage};
use serenity::model::application::{CommandInteraction, Interaction};
use serenity::prelude::*;
use tracing::{error, info, warn};

use acolyt_knowledge::{KnowledgeStatus, RefreshState};

use crate::session::APOLOGY;
use crate::state::STATUS_PREVIEW_NOTES;

use super::bot::Bot;
use super::send::edit_deferred_response;

pub const ASK_COMMAND: &str = "acolyt";
pub const ASK_OPTION: &str = "mensagem";
pub const STATUS_COMMAND: &str = "training-status";

/// `interaction_create` body; the `EventHandler` impl in `bot.rs` delegates here.
impl Bot {
    pub(super) async fn handle_interaction(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };

        match command.data.name.as_str() {
            ASK_COMMAND => self.handle_ask_command(&ctx, &command).await,
            STATUS_COMMAND => self.handle_status_command(&ctx, &command).await,
            other => warn!(command = other, "Unknown slash command"),
        }
    }

    async fn handle_ask_command(&self, ctx: &Context, command: &CommandInteraction) {
        let question = command
            .data
            .options
            .iter()
            .find(|option| option.name == ASK_OPTION)
            .and_then(|option| option.value.as_str())
            .unwrap_or_default()
            .to_string();

        if let Err(e) = command.defer_ephemeral(&ctx.http).await {
            error!("Failed to defer /{} response: {}", ASK_COMMAND, e);
            return;
        }

        let user_id = command.user.id.to_string();
        info!(
            event_kind = "chat_io",
            "Slash command from {} ({}): {}", command.user.name, user_id, question
        );

        let reply = match self.state.session.ask(&user_id, &question).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(user_id = %user_id, "Failed to answer /{}: {}", ASK_COMMAND, e);
                APOLOGY.to_string()
            }
        };

        if let Err(e) = edit_deferred_response(&ctx.http, command, &reply).await {
            error!("Failed to send /{} reply: {}", ASK_COMMAND, e);
        }
    }

    async fn handle_status_command(&self, ctx: &Context, command: &CommandInteraction) {
        let content = match self.state.knowledge.status(STATUS_PREVIEW_NOTES).await {
            Ok(status) => format_status(&status, self.state.refresher.state()),
            Err(e) => {
                error!("Failed to read knowledge status: {}", e);
                APOLOGY.to_string()
            }
        };

        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(content)
                .ephemeral(true),
        );
        if let Err(e) = command.create_response(&ctx.http, response).await {
            error!("Failed to send /{} reply: {}", STATUS_COMMAND, e);
        }
    }
}

/// Render the `/training-status` reply.
pub fn format_status(status: &KnowledgeStatus, refresh: RefreshState) -> String {
    let refreshed = status
        .refreshed_at
        .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "never".to_string());
    let refresh = match refresh {
        RefreshState::Idle => "idle",
        RefreshState::Refreshing => "refreshing",
    };
    let preview = if status.recent_notes.is_empty() {
        "(no notes yet)".to_string()
    } else {
        status
            .recent_notes
            .iter()
            .map(|line| format!("• {line}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "🧠 **Training Status**\n\nIndexed chunks: {}\nNotes: {}\nLast refresh: {} ({})\n\nLatest notes:\n{}",
        status.chunk_count, status.note_count, refreshed, refresh, preview
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn renders_status_with_preview() {
        let status = KnowledgeStatus {
            chunk_count: 12,
            note_count: 5,
            refreshed_at: Some(chrono::Utc.with_ymd_and_hms(2025, 5, 10, 14, 30, 0).unwrap()),
            recent_notes: vec!["Stake to rank up".to_string(), "(empty)".to_string()],
        };
        insta::assert_snapshot!(format_status(&status, RefreshState::Idle), @r"
        🧠 **Training Status**

        Indexed chunks: 12
        Notes: 5
        Last refresh: 2025-05-10 14:30 UTC (idle)

        Latest notes:
        • Stake to rank up
        • (empty)
        ");
    }

    #[test]
    fn renders_empty_status() {
        let status = KnowledgeStatus {
            chunk_count: 0,
            note_count: 0,
            refreshed_at: None,
            recent_notes: Vec::new(),
        };
        let text = format_status(&status, RefreshState::Refreshing);
        assert!(text.contains("Last refresh: never (refreshing)"));
        assert!(text.ends_with("(no notes yet)"));
    }
}
