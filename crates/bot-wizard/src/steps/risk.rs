//! Step 3: risk tolerance and the numeric limits that follow from it.

use super::vocab::{self, RISK_OPTIONS, RISK_RULES};
use super::{Prompt, ValidationOutcome};
use crate::model::{ConfigPatch, ConversationState, RiskLevel};
use crate::tables::WizardTables;

pub fn prompt(state: &ConversationState) -> Prompt {
    let text = if state.is_beginner() {
        "How would you feel if your bot lost money on a bad day? \
         Pick the option that sounds most like you."
    } else {
        "What's your risk tolerance for this bot?"
    };
    let labels: Vec<&str> = RISK_OPTIONS.iter().map(|(label, _)| *label).collect();
    Prompt::new(text).with_options(&labels)
}

pub fn extract(tables: &WizardTables, input: &str, state: &ConversationState) -> ConfigPatch {
    let risk_level =
        vocab::quick_reply(&RISK_OPTIONS, input).or_else(|| vocab::first_match(&RISK_RULES, input));
    let risk_limits = risk_level
        .zip(state.config.capital_allocated)
        .map(|(level, capital)| tables.risk_profiles.limits(level, capital));

    ConfigPatch {
        risk_level,
        risk_limits,
        trading_pair: Some(tables.policy.default_trading_pair.clone()),
        ..Default::default()
    }
}

pub fn validate(tables: &WizardTables, state: &ConversationState) -> Option<ValidationOutcome> {
    let Some(level) = state.config.risk_level else {
        return Some(ValidationOutcome::error(
            "I didn't catch your risk preference. Are you cautious, balanced or aggressive?",
        ));
    };
    let Some(capital) = state.config.capital_allocated else {
        return Some(ValidationOutcome::error(
            "I need to know your capital before setting risk limits.",
        ));
    };

    let cap = RiskLevel::cap_for(state.hints.experience_level);
    if level <= cap {
        return None;
    }
    let limits = tables.risk_profiles.limits(cap, capital);
    Some(
        ValidationOutcome::warning(format!(
            "Since you're new to trading, I've set your risk to {cap} instead of {level}: \
             a {}% stop-loss and at most ${} of losses per day. You can raise it once \
             you've seen the bot in action.",
            limits.stop_loss_percentage, limits.max_daily_loss
        ))
        .with_suggestion(ConfigPatch {
            risk_level: Some(cap),
            risk_limits: Some(limits),
            ..Default::default()
        }),
    )
}
