use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::chunker::chunk_notes;
use crate::embeddings::Embedder;
use crate::errors::{KnowledgeError, KnowledgeResult};
use crate::models::{ChunkSet, KnowledgeChunk};
use crate::store::KnowledgeStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new chunk set was persisted and swapped in.
    Replaced { chunks: usize },
    /// Another refresh was already running.
    Skipped,
}

/// Re-embeds the note log and replaces the store's chunk set.
///
/// At most one refresh runs at a time; concurrent callers get `Skipped`.
pub struct Refresher {
    store: Arc<KnowledgeStore>,
    embedder: Arc<dyn Embedder>,
    embed_timeout: Duration,
    running: AtomicBool,
}

struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Refresher {
    pub fn new(
        store: Arc<KnowledgeStore>,
        embedder: Arc<dyn Embedder>,
        embed_timeout: Duration,
    ) -> Self {
        Self {
            store,
            embedder,
            embed_timeout,
            running: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> RefreshState {
        if self.running.load(Ordering::Acquire) {
            RefreshState::Refreshing
        } else {
            RefreshState::Idle
        }
    }

    pub async fn run_once(&self) -> KnowledgeResult<RefreshOutcome> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Knowledge refresh already running, skipping");
            return Ok(RefreshOutcome::Skipped);
        }
        let _guard = RunningGuard(&self.running);

        let started = Instant::now();
        match self.refresh().await {
            Ok(chunks) => {
                info!(
                    chunks,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Knowledge refresh complete"
                );
                Ok(RefreshOutcome::Replaced { chunks })
            }
            Err(err) => {
                warn!(error = %err, "Knowledge refresh failed, keeping previous chunks");
                Err(err)
            }
        }
    }

    async fn refresh(&self) -> KnowledgeResult<usize> {
        // One read: notes appended after this point wait for the next cycle.
        let notes = self.store.read_notes_text().await?;
        let set = build_chunk_set(self.embedder.as_ref(), &notes, self.embed_timeout).await?;
        let count = set.len();
        self.store.replace(set).await?;
        Ok(count)
    }
}

/// Chunk `notes` and embed every chunk in order. Any failure aborts the
/// whole set.
pub async fn build_chunk_set(
    embedder: &dyn Embedder,
    notes: &str,
    embed_timeout: Duration,
) -> KnowledgeResult<ChunkSet> {
    let pieces = chunk_notes(notes);
    let total = pieces.len();
    let mut chunks = Vec::with_capacity(total);

    for (index, content) in pieces.into_iter().enumerate() {
        let embedding = tokio::time::timeout(embed_timeout, embedder.embed(&content))
            .await
            .map_err(|_| KnowledgeError::EmbeddingTimeout(embed_timeout))??;
        debug!(chunk = index + 1, total, "Embedded knowledge chunk");
        chunks.push(KnowledgeChunk::new(content, embedding));
    }

    ChunkSet::new(chunks, Some(Utc::now()))
}

/// Spawn the periodic refresh loop.
///
/// Each tick spawns `run_once`, so a slow refresh makes later ticks skip
/// rather than queue.
pub fn start_refresh_runner(
    refresher: Arc<Refresher>,
    interval: Duration,
    run_immediately: bool,
) -> tokio::task::JoinHandle<()> {
    let start = if run_immediately {
        Instant::now()
    } else {
        Instant::now() + interval
    };
    let mut ticker = interval_at(start, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let handle = tokio::spawn(async move {
        loop {
            ticker.tick().await;
            let refresher = Arc::clone(&refresher);
            tokio::spawn(async move {
                // Failures are logged by run_once and retried next tick.
                let _ = refresher.run_once().await;
            });
        }
    });

    info!(
        interval_secs = interval.as_secs(),
        run_immediately, "Knowledge refresh runner started"
    );
    handle
}
