//! Application State

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use bot_wizard::{
    BotStore, ConversationEngine, ConversationId, ConversationStore, MemoryBotStore,
    MemoryConversationStore, WizardTables,
};
use tokio::sync::OwnedMutexGuard;

type TurnLocks = Arc<Mutex<HashMap<ConversationId, Arc<tokio::sync::Mutex<()>>>>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Rule-book engine built from the loaded tables
    pub engine: Arc<ConversationEngine>,

    pub tables: Arc<WizardTables>,

    pub conversations: Arc<dyn ConversationStore>,

    pub bots: Arc<dyn BotStore>,

    /// One async lock per conversation so turns never interleave
    turn_locks: TurnLocks,
}

impl AppState {
    /// In-memory stores around the given tables
    pub fn new(tables: WizardTables) -> Self {
        let tables = Arc::new(tables);
        Self {
            engine: Arc::new(ConversationEngine::new(Arc::clone(&tables))),
            tables,
            conversations: Arc::new(MemoryConversationStore::new()),
            bots: Arc::new(MemoryBotStore::new()),
            turn_locks: Arc::default(),
        }
    }

    /// Hold this guard while reading, advancing and saving a conversation
    pub async fn lock_conversation(&self, id: &ConversationId) -> TurnGuard {
        let lock = {
            let mut locks = self.turn_locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(id.clone()).or_default())
        };
        TurnGuard {
            guard: Some(lock.lock_owned().await),
            id: id.clone(),
            locks: Arc::clone(&self.turn_locks),
        }
    }

    #[cfg(test)]
    fn lock_count(&self) -> usize {
        self.turn_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Exclusive turn on one conversation; the lock entry goes away with the
/// last holder or waiter.
pub struct TurnGuard {
    guard: Option<OwnedMutexGuard<()>>,
    id: ConversationId,
    locks: TurnLocks,
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Waiters hold their own clone, so one reference means only the map is left
        if locks.get(&self.id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(&self.id);
        }
    }
}
