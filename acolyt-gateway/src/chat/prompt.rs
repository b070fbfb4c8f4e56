//! Prompt assembly for a single query.

use std::path::Path;

use tracing::warn;

use acolyt_core::PromptMessage;

use crate::chat::history::ConversationTurn;

/// Built-in persona.
///
/// content: prompts/persona.md
pub const DEFAULT_PERSONA: &str = include_str!("../../prompts/persona.md");

const CONTEXT_HEADER: &str = "Relevant info from docs:\n";

/// Build the messages for one completion call.
///
/// Order: persona, retrieved context, prior history, the new user turn.
pub fn build_prompt(
    persona: &str,
    context: &str,
    history: &[ConversationTurn],
    user_text: &str,
) -> Vec<PromptMessage> {
    let mut messages = Vec::with_capacity(history.len() + 3);
    messages.push(PromptMessage::system(persona.trim()));
    messages.push(PromptMessage::system(format!("{CONTEXT_HEADER}{context}")));
    messages.extend(history.iter().map(ConversationTurn::to_prompt_message));
    messages.push(PromptMessage::user(user_text));
    messages
}

/// Load the persona from `path`, falling back to the built-in one.
pub async fn load_persona(path: Option<&str>) -> String {
    let Some(path) = path else {
        return DEFAULT_PERSONA.to_string();
    };

    match tokio::fs::read_to_string(Path::new(path)).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            warn!(path, "Persona file is empty, using built-in persona");
            DEFAULT_PERSONA.to_string()
        }
        Err(err) => {
            warn!(path, error = %err, "Failed to read persona file, using built-in persona");
            DEFAULT_PERSONA.to_string()
        }
    }
}
