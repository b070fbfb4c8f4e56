//! Per-user conversation history.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

use acolyt_core::{MessageRole, PromptMessage};

/// Smallest history that still holds one full exchange.
const MIN_TURNS: usize = 2;

/// Role of a stored conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

impl From<ChatRole> for MessageRole {
    fn from(role: ChatRole) -> Self {
        match role {
            ChatRole::User => MessageRole::User,
            ChatRole::Assistant => MessageRole::Assistant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }

    pub fn to_prompt_message(&self) -> PromptMessage {
        PromptMessage::new(self.role.into(), self.text.clone())
    }
}

/// Bounded history for one user.
///
/// When the cap is exceeded the oldest turns are dropped until the history
/// again starts with a user turn, so exchanges leave as whole pairs.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: VecDeque<ConversationTurn>,
    max_turns: usize,
}

impl ConversationHistory {
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            max_turns: max_turns.max(MIN_TURNS),
        }
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push_back(turn);
        self.evict();
    }

    /// Append a completed exchange in one step.
    pub fn record_exchange(&mut self, user_text: impl Into<String>, reply: impl Into<String>) {
        self.turns.push_back(ConversationTurn::user(user_text));
        self.turns.push_back(ConversationTurn::assistant(reply));
        self.evict();
    }

    fn evict(&mut self) {
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
            while matches!(self.turns.front(), Some(turn) if turn.role == ChatRole::Assistant) {
                self.turns.pop_front();
            }
        }
    }

    pub fn turns(&self) -> &VecDeque<ConversationTurn> {
        &self.turns
    }

    pub fn to_vec(&self) -> Vec<ConversationTurn> {
        self.turns.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Users kept before idle histories are evicted.
pub const DEFAULT_MAX_USERS: usize = 10_000;

#[derive(Debug)]
struct UserSlot {
    history: Arc<AsyncMutex<ConversationHistory>>,
    last_used: u64,
}

#[derive(Debug, Default)]
struct UserSlots {
    slots: HashMap<String, UserSlot>,
    clock: u64,
}

impl UserSlots {
    /// Drop the least recently used history nobody currently holds.
    fn evict_idle(&mut self) -> Option<String> {
        let user = self
            .slots
            .iter()
            .filter(|(_, slot)| Arc::strong_count(&slot.history) == 1)
            .min_by_key(|(_, slot)| slot.last_used)
            .map(|(user, _)| user.clone())?;
        self.slots.remove(&user);
        Some(user)
    }
}

/// Histories keyed by user id.
///
/// Each user has its own async mutex; holding the guard from `lock` gives
/// exclusive access to that user's history for the duration of a query.
/// At most `max_users` histories are kept: adding a user beyond that drops
/// the least recently active one that is not locked.
#[derive(Debug)]
pub struct ConversationStore {
    users: Mutex<UserSlots>,
    max_turns: usize,
    max_users: usize,
}

impl ConversationStore {
    pub fn new(max_turns: usize) -> Self {
        Self::with_max_users(max_turns, DEFAULT_MAX_USERS)
    }

    pub fn with_max_users(max_turns: usize, max_users: usize) -> Self {
        Self {
            users: Mutex::new(UserSlots::default()),
            max_turns,
            max_users: max_users.max(1),
        }
    }

    fn slot(&self, user: &str) -> Arc<AsyncMutex<ConversationHistory>> {
        let mut users = self
            .users
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        users.clock += 1;
        let now = users.clock;

        if let Some(slot) = users.slots.get_mut(user) {
            slot.last_used = now;
            return Arc::clone(&slot.history);
        }

        if users.slots.len() >= self.max_users
            && let Some(evicted) = users.evict_idle()
        {
            debug!(user_id = %evicted, "Evicted idle conversation history");
        }

        let history = Arc::new(AsyncMutex::new(ConversationHistory::new(self.max_turns)));
        users.slots.insert(
            user.to_string(),
            UserSlot {
                history: Arc::clone(&history),
                last_used: now,
            },
        );
        history
    }

    pub async fn lock(&self, user: &str) -> OwnedMutexGuard<ConversationHistory> {
        self.slot(user).lock_owned().await
    }

    pub async fn append(&self, user: &str, turn: ConversationTurn) {
        self.lock(user).await.push(turn);
    }

    pub async fn get(&self, user: &str) -> Vec<ConversationTurn> {
        self.lock(user).await.to_vec()
    }

    pub fn user_count(&self) -> usize {
        self.users
            .lock()
            .map(|users| users.slots.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().slots.len())
    }
}
