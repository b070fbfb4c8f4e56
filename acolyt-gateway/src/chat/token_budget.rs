//! Token estimation and history budgeting.
//!
//! Pure functions for estimating token usage without requiring a tokenizer.
//! Uses a `ceil(chars / 3.5)` heuristic (~20% margin, works across providers).

use crate::chat::history::{ChatRole, ConversationTurn};

/// Per-turn overhead (~4 tokens for role/structure).
const TURN_OVERHEAD: u32 = 4;

/// Estimate token count from text using chars/3.5 heuristic.
pub fn estimate_tokens(text: &str) -> u32 {
    (text.len() as f64 / 3.5).ceil() as u32
}

pub fn estimate_turn_tokens(turn: &ConversationTurn) -> u32 {
    TURN_OVERHEAD + estimate_tokens(&turn.text)
}

/// Estimate tokens for a chat history.
pub fn estimate_history_tokens(turns: &[ConversationTurn]) -> u32 {
    turns.iter().map(estimate_turn_tokens).sum()
}

/// Newest suffix of `turns` that fits in `budget` estimated tokens.
///
/// The suffix always starts with a user turn, so a reply is never sent
/// without the question that produced it.
pub fn trim_history_to_budget(turns: &[ConversationTurn], budget: u32) -> &[ConversationTurn] {
    let mut used = 0u32;
    let mut start = turns.len();
    for (index, turn) in turns.iter().enumerate().rev() {
        used = used.saturating_add(estimate_turn_tokens(turn));
        if used > budget {
            break;
        }
        start = index;
    }

    let mut window = &turns[start..];
    while let Some((first, rest)) = window.split_first() {
        if first.role == ChatRole::User {
            break;
        }
        window = rest;
    }
    window
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens_basic() {
        // 7 chars -> ceil(7/3.5) = 2
        assert_eq!(estimate_tokens("hello!!"), 2);
        // Empty
        assert_eq!(estimate_tokens(""), 0);
        // 35 chars -> 10
        let text = "a".repeat(35);
        assert_eq!(estimate_tokens(&text), 10);
    }

    #[test]
    fn test_estimate_tokens_unicode() {
        // Multi-byte text is counted by bytes, which overestimates
        let pt = "ação"; // 6 bytes in UTF-8
        assert_eq!(estimate_tokens(pt), 2);
    }

    #[test]
    fn test_history_estimate_includes_overhead() {
        let turns = vec![
            ConversationTurn::user("a".repeat(7)),
            ConversationTurn::assistant(""),
        ];
        assert_eq!(estimate_history_tokens(&turns), 4 + 2 + 4);
    }

    #[test]
    fn trims_to_newest_whole_exchanges() {
        let turns = vec![
            ConversationTurn::user("a".repeat(35)),
            ConversationTurn::assistant("b".repeat(35)),
            ConversationTurn::user("c".repeat(35)),
            ConversationTurn::assistant("d".repeat(35)),
        ];
        // Each turn costs 14; 42 fits three turns but the oldest of those is
        // an assistant reply, so only the last exchange survives.
        let kept = trim_history_to_budget(&turns, 42);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].text, "c".repeat(35));

        assert_eq!(trim_history_to_budget(&turns, 1_000).len(), 4);
        assert!(trim_history_to_budget(&turns, 10).is_empty());
    }
}
