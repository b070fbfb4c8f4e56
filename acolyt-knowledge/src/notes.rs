//! Append-only note log.
//!
//! Notes are stored as UTF-8 markdown, one entry per note:
//!
//! ```text
//! # From {author} ({rfc3339 timestamp})
//! {body}
//!
//! ```
//!
//! Text before the first header (hand-written seed material) is still
//! chunked for retrieval but is not reported as a note.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::errors::KnowledgeResult;

const HEADER_PREFIX: &str = "# From ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub body: String,
}

impl Note {
    pub fn new(author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            timestamp: Utc::now(),
            body: body.into(),
        }
    }

    /// Render the note exactly as it is appended to the log.
    pub fn to_log_entry(&self) -> String {
        format!(
            "{HEADER_PREFIX}{} ({})\n{}\n\n",
            self.author,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.body.trim()
        )
    }

    /// First non-blank body line, used for previews.
    pub fn first_line(&self) -> Option<&str> {
        self.body.lines().map(str::trim).find(|line| !line.is_empty())
    }
}

fn parse_header(line: &str) -> Option<(String, DateTime<Utc>)> {
    let rest = line.trim_end().strip_prefix(HEADER_PREFIX)?;
    let rest = rest.strip_suffix(')')?;
    let (author, timestamp) = rest.rsplit_once(" (")?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp).ok()?;
    Some((author.trim().to_string(), timestamp.with_timezone(&Utc)))
}

/// Parse every headed note out of a raw log, in log order.
pub fn parse_notes(log: &str) -> Vec<Note> {
    let mut notes = Vec::new();
    let mut current: Option<(String, DateTime<Utc>, Vec<&str>)> = None;

    for line in log.lines() {
        if let Some((author, timestamp)) = parse_header(line) {
            if let Some((author, timestamp, body)) = current.take() {
                notes.push(finish_note(author, timestamp, &body));
            }
            current = Some((author, timestamp, Vec::new()));
        } else if let Some((_, _, body)) = current.as_mut() {
            body.push(line);
        }
    }
    if let Some((author, timestamp, body)) = current {
        notes.push(finish_note(author, timestamp, &body));
    }

    notes
}

fn finish_note(author: String, timestamp: DateTime<Utc>, body: &[&str]) -> Note {
    Note {
        author,
        timestamp,
        body: body.join("\n").trim().to_string(),
    }
}

/// File-backed note log. Appends and reads are serialized in-process so a
/// reader never observes a half-written entry.
#[derive(Debug)]
pub struct NoteLog {
    path: PathBuf,
    io_lock: Mutex<()>,
}

impl NoteLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, note: &Note) -> KnowledgeResult<()> {
        let _guard = self.io_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(note.to_log_entry().as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Whole log as one string; a missing log reads as empty.
    pub async fn read_raw(&self) -> KnowledgeResult<String> {
        let _guard = self.io_lock.lock().await;
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn read_notes(&self) -> KnowledgeResult<Vec<Note>> {
        Ok(parse_notes(&self.read_raw().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn note_at(author: &str, body: &str, secs: i64) -> Note {
        Note {
            author: author.to_string(),
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn log_entry_format() {
        let note = note_at("ana", "  Stake $ACOLYT to rank up.  ", 1_746_000_000);
        assert_eq!(
            note.to_log_entry(),
            "# From ana (2025-04-30T08:00:00.000Z)\nStake $ACOLYT to rank up.\n\n"
        );
    }

    #[test]
    fn parses_entries_and_ignores_preamble() {
        let log = format!(
            "Seed paragraph without header.\n\n{}{}",
            note_at("ana", "first line\nsecond line", 1_746_000_000).to_log_entry(),
            note_at("bo (mod)", "other", 1_746_000_060).to_log_entry(),
        );
        let notes = parse_notes(&log);
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].author, "ana");
        assert_eq!(notes[0].body, "first line\nsecond line");
        assert_eq!(notes[1].author, "bo (mod)");
        assert_eq!(notes[1].timestamp.timestamp(), 1_746_000_060);
    }

    #[test]
    fn accepts_javascript_iso_timestamps() {
        let notes = parse_notes("# From ana (2025-05-10T12:34:56.789Z)\nhello\n\n");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].first_line(), Some("hello"));
    }

    #[test]
    fn malformed_header_is_body_text() {
        let notes = parse_notes("# From ana (2025-05-10T12:34:56Z)\n# From nobody (yesterday)\n");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].body, "# From nobody (yesterday)");
    }

    #[tokio::test]
    async fn append_then_read_back() {
        let temp = tempfile::TempDir::new().unwrap();
        let log = NoteLog::new(temp.path().join("knowledge").join("training-notes.md"));

        assert_eq!(log.read_raw().await.unwrap(), "");

        log.append(&Note::new("ana", "one")).await.unwrap();
        log.append(&Note::new("bo", "two")).await.unwrap();

        let notes = log.read_notes().await.unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[1].body, "two");
        assert!(log.read_raw().await.unwrap().ends_with("two\n\n"));
    }
}
