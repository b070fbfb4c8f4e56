use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serenity::async_trait;
use serenity::builder::{CreateCommand, CreateCommandOption};
use serenity::model::application::{Command, CommandOptionType, Interaction};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::{ChannelId, UserId};
use serenity::prelude::*;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::session::APOLOGY;
use crate::state::AppState;

use super::interactions::{ASK_COMMAND, ASK_OPTION, STATUS_COMMAND};
use super::send::reply_to_message;

/// Maximum duration for a typing indicator before it auto-stops.
const TYPING_TIMEOUT: Duration = Duration::from_secs(180);

/// Typing indicator with an automatic timeout.
///
/// Wraps serenity's `Typing` so that the indicator stops after
/// [`TYPING_TIMEOUT`] even if the owning task hangs or panics.
/// Dropping this struct cancels the timeout and stops typing immediately.
struct TimedTyping {
    _handle: JoinHandle<()>,
}

impl TimedTyping {
    fn start(channel_id: ChannelId, http: &Arc<serenity::http::Http>) -> Self {
        let typing = channel_id.start_typing(http);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(TYPING_TIMEOUT).await;
            drop(typing);
        });
        Self { _handle: handle }
    }
}

impl Drop for TimedTyping {
    fn drop(&mut self) {
        self._handle.abort();
    }
}

/// Discord bot handler
///
/// Chat handling is delegated to `state.session`; this type only deals with
/// Discord events.
pub struct Bot {
    pub(super) state: Arc<AppState>,
    bot_user: OnceLock<UserId>,
}

impl Bot {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            bot_user: OnceLock::new(),
        }
    }

    fn is_training_channel(&self, channel_id: ChannelId) -> bool {
        self.state.training_channel_id == Some(channel_id.get())
    }

    /// A message gets an answer when it mentions the bot or replies to a bot.
    fn should_reply(&self, msg: &Message) -> bool {
        let mentioned = self
            .bot_user
            .get()
            .is_some_and(|id| msg.mentions_user_id(*id));
        let replies_to_bot = msg
            .referenced_message
            .as_ref()
            .is_some_and(|referenced| referenced.author.bot);
        mentioned || replies_to_bot
    }

    async fn capture_training_note(&self, msg: &Message) {
        let body = msg.content.trim();
        if body.is_empty() {
            return;
        }
        match self.state.knowledge.append(&msg.author.name, body).await {
            Ok(_) => info!(author = %msg.author.name, "Captured training note"),
            Err(e) => error!("Failed to append training note: {}", e),
        }
    }
}

/// Remove mentions of the bot from message text.
pub fn strip_bot_mention(content: &str, bot_user: Option<UserId>) -> String {
    let Some(id) = bot_user else {
        return content.trim().to_string();
    };
    content
        .replace(&format!("<@{}>", id.get()), "")
        .replace(&format!("<@!{}>", id.get()), "")
        .trim()
        .to_string()
}

#[async_trait]
impl EventHandler for Bot {
    /// Handle incoming messages
    async fn message(&self, ctx: Context, msg: Message) {
        // Ignore messages from bots (including ourselves)
        if msg.author.bot {
            return;
        }

        if self.is_training_channel(msg.channel_id) {
            self.capture_training_note(&msg).await;
        }

        if !self.should_reply(&msg) {
            return;
        }

        let question = strip_bot_mention(&msg.content, self.bot_user.get().copied());
        if question.is_empty() {
            return;
        }

        let user_id = msg.author.id.to_string();
        info!(
            event_kind = "chat_io",
            "Discord message from {} ({}): {}", msg.author.name, user_id, question
        );

        let typing = TimedTyping::start(msg.channel_id, &ctx.http);
        let reply = match self.state.session.ask(&user_id, &question).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(user_id = %user_id, "Failed to answer Discord message: {}", e);
                APOLOGY.to_string()
            }
        };
        drop(typing);

        if let Err(e) = reply_to_message(&ctx.http, &msg, &reply).await {
            error!("Failed to send Discord reply: {}", e);
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        self.handle_interaction(ctx, interaction).await;
    }

    /// Register slash commands once connected
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Discord bot connected as {}", ready.user.name);
        let _ = self.bot_user.set(ready.user.id);

        let commands = vec![
            CreateCommand::new(ASK_COMMAND)
                .description("Talk to Acolyt, your AI assistant")
                .add_option(
                    CreateCommandOption::new(
                        CommandOptionType::String,
                        ASK_OPTION,
                        "What do you want to ask?",
                    )
                    .required(true),
                ),
            CreateCommand::new(STATUS_COMMAND)
                .description("Check current training knowledge status"),
        ];

        if let Err(e) = Command::set_global_commands(&ctx.http, commands).await {
            error!("Failed to register slash commands: {}", e);
        }
    }
}
