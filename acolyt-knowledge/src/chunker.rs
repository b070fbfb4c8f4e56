/// Split raw note-log text into retrievable chunks.
///
/// A chunk is a run of non-blank lines; one or more blank (or
/// whitespace-only) lines end it. Chunks are trimmed and empty ones dropped,
/// so the output order follows the log order.
pub fn chunk_notes(input: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in input.lines() {
        if line.trim().is_empty() {
            flush(&mut current, &mut chunks);
        } else {
            current.push(line);
        }
    }
    flush(&mut current, &mut chunks);

    chunks
}

fn flush(current: &mut Vec<&str>, chunks: &mut Vec<String>) {
    if current.is_empty() {
        return;
    }
    let content = current.join("\n").trim().to_string();
    if !content.is_empty() {
        chunks.push(content);
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_blank_lines() {
        let input = "# From ana (2025-05-01T10:00:00Z)\nStake to unlock tiers.\n\n# From bo (2025-05-02T10:00:00Z)\nDashboards live at usesignal.ai\n\n";
        let chunks = chunk_notes(input);
        assert_eq!(chunks.len(), 2);
        assert_eq!(
            chunks[0],
            "# From ana (2025-05-01T10:00:00Z)\nStake to unlock tiers."
        );
        assert!(chunks[1].ends_with("usesignal.ai"));
    }

    #[test]
    fn collapses_runs_of_blank_and_whitespace_lines() {
        let input = "\n\nfirst\n\n\n  \t\nsecond\nstill second\n\n\n";
        let chunks = chunk_notes(input);
        assert_eq!(chunks, vec!["first", "second\nstill second"]);
    }

    #[test]
    fn handles_crlf_and_trailing_text() {
        let chunks = chunk_notes("alpha\r\n\r\nbeta");
        assert_eq!(chunks, vec!["alpha", "beta"]);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_notes("").is_empty());
        assert!(chunk_notes("\n \n\n").is_empty());
    }
}
