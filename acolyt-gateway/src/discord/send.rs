use serenity::builder::{
    CreateInteractionResponseFollowup, CreateMessage, EditInteractionResponse,
};
use serenity::http::Http;
use serenity::model::application::CommandInteraction;
use serenity::model::channel::Message;

pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

/// Split text into Discord-sized messages on line boundaries.
///
/// Code fences left open at a split are closed and reopened in the next
/// chunk. A single line longer than the limit is cut by characters.
pub fn split_discord_message(content: &str) -> Vec<String> {
    if content.chars().count() <= DISCORD_MESSAGE_LIMIT {
        return vec![content.to_string()];
    }

    // Room for "```\n" and "\n```" around fenced continuations.
    let limit = DISCORD_MESSAGE_LIMIT - 8;
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    let mut open_fence = false;

    for line in content.split_inclusive('\n') {
        for piece in hard_wrap(line, limit) {
            let piece_len = piece.chars().count();
            if current_len + piece_len > limit && !current.is_empty() {
                if open_fence {
                    current.push_str("\n```");
                }
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
                if open_fence {
                    current.push_str("```\n");
                    current_len = 4;
                }
            }
            current.push_str(&piece);
            current_len += piece_len;
        }
        if line.trim_start().starts_with("```") {
            open_fence = !open_fence;
        }
    }

    if !current.trim().is_empty() {
        if open_fence {
            current.push_str("\n```");
        }
        chunks.push(current);
    }

    chunks
}

fn hard_wrap(line: &str, limit: usize) -> Vec<String> {
    if line.chars().count() <= limit {
        return vec![line.to_string()];
    }
    let chars: Vec<char> = line.chars().collect();
    chars
        .chunks(limit)
        .map(|piece| piece.iter().collect())
        .collect()
}

/// Reply to `msg`, continuing in the same channel when the text is long.
pub async fn reply_to_message(http: &Http, msg: &Message, content: &str) -> serenity::Result<()> {
    let mut chunks = split_discord_message(content).into_iter();
    if let Some(first) = chunks.next() {
        msg.reply(http, first).await?;
    }
    for chunk in chunks {
        msg.channel_id
            .send_message(http, CreateMessage::new().content(chunk))
            .await?;
    }
    Ok(())
}

/// Fill a deferred ephemeral interaction response, following up with the
/// remaining chunks.
pub async fn edit_deferred_response(
    http: &Http,
    command: &CommandInteraction,
    content: &str,
) -> serenity::Result<()> {
    let mut chunks = split_discord_message(content).into_iter();
    if let Some(first) = chunks.next() {
        command
            .edit_response(http, EditInteractionResponse::new().content(first))
            .await?;
    }
    for chunk in chunks {
        command
            .create_followup(
                http,
                CreateInteractionResponseFollowup::new()
                    .content(chunk)
                    .ephemeral(true),
            )
            .await?;
    }
    Ok(())
}
