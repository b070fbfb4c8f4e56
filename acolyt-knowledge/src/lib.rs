//! Note log, chunk store and retrieval for Acolyt.

pub mod chunker;
pub mod context;
pub mod embeddings;
pub mod errors;
pub mod models;
pub mod notes;
pub mod paths;
pub mod refresh;
pub mod search;
pub mod storage;
pub mod store;

pub use acolyt_core::config::{KnowledgeSettings, RetrievalDefaults};
pub use context::{NO_CONTEXT, assemble};
pub use embeddings::{Embedder, EmbeddingClient};
pub use errors::{KnowledgeError, KnowledgeResult};
pub use models::{ChunkSet, KnowledgeChunk, KnowledgeStatus};
pub use notes::Note;
pub use refresh::{RefreshOutcome, RefreshState, Refresher, start_refresh_runner};
pub use search::{RankedMatch, cosine_similarity, rank, top_k};
pub use store::KnowledgeStore;
