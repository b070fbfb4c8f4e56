//! OpenAI-compatible completion provider.

pub mod client;

pub use client::OpenAiCompatibleClient;
