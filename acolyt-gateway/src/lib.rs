pub mod chat;
pub mod discord;
pub mod providers;
pub mod session;
pub mod state;

pub use providers::provider::{
    Provider, ProviderError, ProviderResponse, ProviderUsage, extract_text,
};
pub use session::{APOLOGY, ChatError, ChatSession, SessionOptions};
pub use state::{AppState, StateError};
