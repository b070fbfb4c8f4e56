//! Hits the real embeddings endpoint. Run with `--features live-tests` and
//! `OPENAI_API_KEY` set.
#![cfg(feature = "live-tests")]

use acolyt_knowledge::{Embedder, EmbeddingClient, KnowledgeSettings};

#[tokio::test]
async fn test_openai_embedding_live() {
    let _ = dotenvy::dotenv();
    let api_key = std::env::var("OPENAI_API_KEY").ok();
    let settings = KnowledgeSettings::default();
    let client = EmbeddingClient::new(&settings, api_key);
    let inputs = vec!["hello world".to_string(), "acolyt knowledge".to_string()];

    let embeddings = client.embed_batch(&inputs).await.expect("embedding request");
    assert_eq!(embeddings.len(), inputs.len());
    let dim = embeddings[0].len();
    assert!(dim > 0);
    assert!(embeddings.iter().all(|vec| vec.len() == dim));

    let single = client.embed("hello world").await.expect("single embedding");
    assert_eq!(single.len(), dim);
}
