//! Chunk file persistence.
//!
//! The chunk file is a pretty-printed JSON array of `{content, embedding}`
//! records, rewritten as a whole on every refresh.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

use crate::errors::{KnowledgeError, KnowledgeResult};
use crate::models::{ChunkSet, KnowledgeChunk};

/// Read a chunk file. Missing or unreadable files map to `StoreUnavailable`.
pub async fn load_chunk_file(path: &Path) -> KnowledgeResult<ChunkSet> {
    let unavailable = |reason: String| KnowledgeError::StoreUnavailable {
        path: path.to_path_buf(),
        reason,
    };

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| unavailable(err.to_string()))?;
    let chunks: Vec<KnowledgeChunk> =
        serde_json::from_slice(&bytes).map_err(|err| unavailable(err.to_string()))?;

    let refreshed_at = tokio::fs::metadata(path)
        .await
        .ok()
        .and_then(|meta| meta.modified().ok())
        .map(DateTime::<Utc>::from);

    ChunkSet::new(chunks, refreshed_at).map_err(|err| unavailable(err.to_string()))
}

/// Write a chunk file atomically: temp file in the same directory, then rename.
pub async fn write_chunk_file(path: &Path, set: &ChunkSet) -> KnowledgeResult<()> {
    let json = serde_json::to_vec_pretty(set.chunks())?;
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || -> KnowledgeResult<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir()?,
        };
        std::fs::create_dir_all(&dir)?;

        let mut temp = NamedTempFile::new_in(&dir)?;
        temp.write_all(&json)?;
        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|err| err.error)?;
        Ok(())
    })
    .await
    .map_err(|err| KnowledgeError::Io(std::io::Error::other(err)))?
}
