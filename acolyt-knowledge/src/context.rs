use crate::search::RankedMatch;

/// Context text used when nothing relevant was retrieved.
pub const NO_CONTEXT: &str = "(no relevant notes found)";

const TRUNCATION_MARK: char = '…';

/// Join ranked matches into one context block of at most `max_chars`
/// characters. Pieces are trimmed, empty ones dropped, and separated by a
/// blank line.
pub fn assemble(matches: &[RankedMatch<'_>], max_chars: usize) -> String {
    let joined = matches
        .iter()
        .map(|m| m.content.trim())
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    if joined.is_empty() || max_chars == 0 {
        return NO_CONTEXT.to_string();
    }

    match joined.char_indices().nth(max_chars) {
        None => joined,
        Some(_) => {
            // The marker counts against the budget.
            let keep = max_chars.saturating_sub(1);
            let mut truncated: String = joined.chars().take(keep).collect();
            truncated.push(TRUNCATION_MARK);
            truncated
        }
    }
}
