//! Conversation and Bot Persistence
//!
//! Store traits plus in-memory implementations for development and tests.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chat_core::{Conversation, Message};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::Turn;
use crate::error::{Result, WizardError};
use crate::model::{BotOptionVariant, ConversationState, TradingMode};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Unique conversation identifier
    ConversationId
);

string_id!(
    /// Unique bot identifier
    BotId
);

/// A stored conversation: wizard state plus the visible transcript
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    pub id: ConversationId,
    pub user_id: String,
    pub state: ConversationState,
    pub transcript: Conversation,
    /// Set only once a bot has been persisted from this conversation
    pub completed: bool,
    pub bot_id: Option<BotId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationRecord {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self::with_id(ConversationId::new(), user_id)
    }

    pub fn with_id(id: ConversationId, user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id: user_id.into(),
            state: ConversationState::new(),
            transcript: Conversation::new(),
            completed: false,
            bot_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Record one exchange and take over the turn's state.
    ///
    /// A restart wipes the transcript; only the fresh greeting is kept.
    pub fn record_turn(&mut self, user_input: &str, turn: &Turn) {
        if turn.restarted {
            self.transcript.clear();
        } else {
            self.transcript.push(Message::user(user_input));
        }
        self.transcript.push(turn.to_message());
        self.state = turn.state.clone();
        self.touch();
    }

    pub(crate) fn complete(&mut self, bot_id: BotId) {
        self.completed = true;
        self.bot_id = Some(bot_id);
        self.touch();
    }
}

/// A bot created from one offered variant
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotRecord {
    pub id: BotId,
    pub conversation_id: ConversationId,
    pub user_id: String,
    pub name: String,
    pub trading_mode: TradingMode,
    pub variant: BotOptionVariant,
    pub created_at: DateTime<Utc>,
}

/// Conversation persistence
pub trait ConversationStore: Send + Sync {
    fn save(&self, record: &ConversationRecord) -> Result<()>;

    /// Load a conversation owned by `user_id`; other users' records are invisible
    fn load(&self, id: &ConversationId, user_id: &str) -> Result<Option<ConversationRecord>>;

    fn delete(&self, id: &ConversationId) -> Result<()>;

    /// Most recently updated first
    fn list(&self, user_id: &str, limit: usize) -> Result<Vec<ConversationRecord>>;
}

/// Bot persistence
pub trait BotStore: Send + Sync {
    fn insert(&self, bot: &BotRecord) -> Result<()>;

    fn get(&self, id: &BotId) -> Result<Option<BotRecord>>;

    fn list_for_user(&self, user_id: &str) -> Result<Vec<BotRecord>>;
}

fn poisoned<T>(_: PoisonError<T>) -> WizardError {
    WizardError::Store("store lock poisoned".into())
}

/// In-memory conversation store
#[derive(Default)]
pub struct MemoryConversationStore {
    records: RwLock<HashMap<ConversationId, ConversationRecord>>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConversationStore for MemoryConversationStore {
    fn save(&self, record: &ConversationRecord) -> Result<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn load(&self, id: &ConversationId, user_id: &str) -> Result<Option<ConversationRecord>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.get(id).filter(|r| r.user_id == user_id).cloned())
    }

    fn delete(&self, id: &ConversationId) -> Result<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        records.remove(id);
        Ok(())
    }

    fn list(&self, user_id: &str, limit: usize) -> Result<Vec<ConversationRecord>> {
        let records = self.records.read().map_err(poisoned)?;
        let mut result: Vec<_> = records
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();

        result.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        result.truncate(limit);

        Ok(result)
    }
}

/// In-memory bot store
#[derive(Default)]
pub struct MemoryBotStore {
    bots: RwLock<HashMap<BotId, BotRecord>>,
}

impl MemoryBotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BotStore for MemoryBotStore {
    fn insert(&self, bot: &BotRecord) -> Result<()> {
        let mut bots = self.bots.write().map_err(poisoned)?;
        bots.insert(bot.id.clone(), bot.clone());
        Ok(())
    }

    fn get(&self, id: &BotId) -> Result<Option<BotRecord>> {
        let bots = self.bots.read().map_err(poisoned)?;
        Ok(bots.get(id).cloned())
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<BotRecord>> {
        let bots = self.bots.read().map_err(poisoned)?;
        let mut result: Vec<_> = bots
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }
}
