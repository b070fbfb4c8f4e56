use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{info, warn};

use crate::KnowledgeSettings;
use crate::errors::KnowledgeResult;
use crate::models::{ChunkSet, KnowledgeStatus};
use crate::notes::{Note, NoteLog};
use crate::paths;
use crate::storage::{load_chunk_file, write_chunk_file};

const PREVIEW_CHARS: usize = 80;
const EMPTY_PREVIEW: &str = "(empty)";

/// Note log plus the chunk set currently used for retrieval.
///
/// Readers take an `Arc<ChunkSet>` snapshot; `replace` persists a new set and
/// swaps it in as a single reference replacement, so a query never sees a
/// partially refreshed set.
#[derive(Debug)]
pub struct KnowledgeStore {
    notes: NoteLog,
    embeds_path: PathBuf,
    embedding_dim: Option<usize>,
    current: watch::Sender<Arc<ChunkSet>>,
    replace_lock: Mutex<()>,
}

impl KnowledgeStore {
    pub fn new(
        notes_path: impl Into<PathBuf>,
        embeds_path: impl Into<PathBuf>,
        embedding_dim: Option<usize>,
    ) -> Self {
        let (current, _) = watch::channel(Arc::new(ChunkSet::empty()));
        Self {
            notes: NoteLog::new(notes_path),
            embeds_path: embeds_path.into(),
            embedding_dim,
            current,
            replace_lock: Mutex::new(()),
        }
    }

    /// Resolve paths from settings and load the chunk file.
    ///
    /// An unusable chunk file is logged and the store starts empty.
    pub async fn open(settings: &KnowledgeSettings) -> KnowledgeResult<Self> {
        let store = Self::new(
            paths::notes_path(settings)?,
            paths::embeds_path(settings)?,
            settings.embedding_dim,
        );

        match store.load().await {
            Ok(set) => {
                info!(
                    chunks = set.len(),
                    path = %store.embeds_path.display(),
                    "Loaded knowledge chunks"
                );
                store.current.send_replace(Arc::new(set));
            }
            Err(err) => {
                warn!(error = %err, "Knowledge store unavailable, starting without context");
            }
        }

        Ok(store)
    }

    pub fn notes_path(&self) -> &Path {
        self.notes.path()
    }

    pub fn embeds_path(&self) -> &Path {
        &self.embeds_path
    }

    /// Read the chunk file without touching the in-memory snapshot.
    pub async fn load(&self) -> KnowledgeResult<ChunkSet> {
        let set = load_chunk_file(&self.embeds_path).await?;
        set.check_dimension(self.embedding_dim)?;
        Ok(set)
    }

    pub fn snapshot(&self) -> Arc<ChunkSet> {
        self.current.borrow().clone()
    }

    /// Watch for snapshot swaps.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ChunkSet>> {
        self.current.subscribe()
    }

    /// Append a note to the log. The loaded chunk set is not affected until
    /// the next refresh.
    pub async fn append(
        &self,
        author: impl Into<String>,
        body: impl Into<String>,
    ) -> KnowledgeResult<Note> {
        let note = Note::new(author, body);
        self.notes.append(&note).await?;
        Ok(note)
    }

    pub async fn read_notes_text(&self) -> KnowledgeResult<String> {
        self.notes.read_raw().await
    }

    /// Persist `set`, then make it the current snapshot. If persisting fails
    /// the previous file and snapshot stay in place.
    pub async fn replace(&self, set: ChunkSet) -> KnowledgeResult<()> {
        set.check_dimension(self.embedding_dim)?;
        let _guard = self.replace_lock.lock().await;
        write_chunk_file(&self.embeds_path, &set).await?;
        self.current.send_replace(Arc::new(set));
        Ok(())
    }

    pub async fn status(&self, preview: usize) -> KnowledgeResult<KnowledgeStatus> {
        let snapshot = self.snapshot();
        let notes = self.notes.read_notes().await?;
        let skip = notes.len().saturating_sub(preview);
        let recent_notes = notes[skip..].iter().map(preview_line).collect();

        Ok(KnowledgeStatus {
            chunk_count: snapshot.len(),
            note_count: notes.len(),
            refreshed_at: snapshot.refreshed_at(),
            recent_notes,
        })
    }
}

fn preview_line(note: &Note) -> String {
    match note.first_line() {
        Some(line) => line.chars().take(PREVIEW_CHARS).collect(),
        None => EMPTY_PREVIEW.to_string(),
    }
}
