pub mod history;
pub mod prompt;
pub mod token_budget;

pub use history::{ChatRole, ConversationHistory, ConversationStore, ConversationTurn};
pub use prompt::{DEFAULT_PERSONA, build_prompt, load_persona};
