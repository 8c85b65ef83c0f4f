//! Bot Creation
//!
//! Persists the chosen variant as a bot and only then marks the conversation
//! complete, so a completed conversation always has a bot behind it.

use chrono::Utc;

use crate::derivation::ConfigurationDeriver;
use crate::error::{Result, WizardError};
use crate::model::VariantId;
use crate::store::{BotId, BotRecord, BotStore, ConversationId, ConversationStore};

/// Create a bot from one of the offered variants.
///
/// The variant is re-derived from the stored state rather than taken from
/// the client, so the persisted numbers are always the canonical ones.
pub fn deploy_bot(
    conversations: &dyn ConversationStore,
    bots: &dyn BotStore,
    deriver: &ConfigurationDeriver,
    conversation_id: &ConversationId,
    user_id: &str,
    option_id: VariantId,
) -> Result<BotRecord> {
    let mut record = conversations
        .load(conversation_id, user_id)?
        .ok_or_else(|| WizardError::ConversationNotFound(conversation_id.to_string()))?;

    if record.completed {
        return Err(WizardError::AlreadyCompleted(conversation_id.to_string()));
    }
    if !record.state.ready_to_deploy {
        return Err(WizardError::NotReadyToDeploy(conversation_id.to_string()));
    }

    let variant = deriver.variant(&record.state, option_id)?;
    let name = record.state.config.name.clone().map_or_else(
        || format!("{} Bot", option_id.label()),
        |name| format!("{name} ({})", option_id.label()),
    );
    let bot = BotRecord {
        id: BotId::new(),
        conversation_id: conversation_id.clone(),
        user_id: user_id.to_string(),
        name,
        trading_mode: record.state.config.trading_mode,
        variant,
        created_at: Utc::now(),
    };

    bots.insert(&bot)?;
    record.complete(bot.id.clone());
    conversations.save(&record)?;

    tracing::info!(
        bot_id = %bot.id,
        conversation_id = %conversation_id,
        option = option_id.label(),
        "Bot created"
    );
    Ok(bot)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::ConversationEngine;
    use crate::model::{RiskLevel, TradingMode};
    use crate::store::{ConversationRecord, MemoryBotStore, MemoryConversationStore};
    use crate::tables::WizardTables;
    use rust_decimal_macros::dec;

    fn setup(replies: &[&str]) -> (MemoryConversationStore, MemoryBotStore, ConversationRecord) {
        let engine = ConversationEngine::default();
        let mut record = ConversationRecord::new("alice");
        for reply in replies {
            let turn = engine.advance(&record.state, reply).unwrap();
            record.record_turn(reply, &turn);
        }
        let conversations = MemoryConversationStore::new();
        conversations.save(&record).unwrap();
        (conversations, MemoryBotStore::new(), record)
    }

    fn deriver() -> ConfigurationDeriver {
        ConfigurationDeriver::new(Arc::new(WizardTables::default()))
    }

    fn deploy(
        conversations: &MemoryConversationStore,
        bots: &MemoryBotStore,
        record: &ConversationRecord,
        user_id: &str,
        option: VariantId,
    ) -> Result<BotRecord> {
        deploy_bot(conversations, bots, &deriver(), &record.id, user_id, option)
    }

    const FULL_FLOW: [&str; 5] = [
        "Build wealth over time",
        "$500 - $2,000",
        "Very cautious - Protect my capital",
        "Yes, sounds good!",
        "Deploy Bot!",
    ];

    #[test]
    fn test_deploy_persists_then_completes() {
        let (conversations, bots, record) = setup(&FULL_FLOW);
        let bot = deploy(&conversations, &bots, &record, "alice", VariantId::Balanced).unwrap();

        assert_eq!(bot.name, "DCA BTC Bot (Balanced)");
        assert_eq!(bot.trading_mode, TradingMode::Paper);
        assert_eq!(bot.variant.risk_level, RiskLevel::Medium);
        assert_eq!(bot.variant.config.limits.max_daily_loss, dec!(50));
        assert_eq!(bots.get(&bot.id).unwrap(), Some(bot.clone()));

        let stored = conversations.load(&record.id, "alice").unwrap().unwrap();
        assert!(stored.completed);
        assert_eq!(stored.bot_id, Some(bot.id));
    }

    #[test]
    fn test_second_deploy_rejected() {
        let (conversations, bots, record) = setup(&FULL_FLOW);
        deploy(&conversations, &bots, &record, "alice", VariantId::Conservative).unwrap();
        let err =
            deploy(&conversations, &bots, &record, "alice", VariantId::Aggressive).unwrap_err();
        assert!(matches!(err, WizardError::AlreadyCompleted(_)));
        assert_eq!(bots.list_for_user("alice").unwrap().len(), 1);
    }

    #[test]
    fn test_not_ready_rejected() {
        let (conversations, bots, record) = setup(&FULL_FLOW[..4]);
        let err = deploy(&conversations, &bots, &record, "alice", VariantId::Balanced).unwrap_err();
        assert!(matches!(err, WizardError::NotReadyToDeploy(_)));
        assert!(bots.list_for_user("alice").unwrap().is_empty());
    }

    #[test]
    fn test_other_users_conversation_not_found() {
        let (conversations, bots, record) = setup(&FULL_FLOW);
        let err =
            deploy(&conversations, &bots, &record, "mallory", VariantId::Balanced).unwrap_err();
        assert!(matches!(err, WizardError::ConversationNotFound(_)));
    }
}
