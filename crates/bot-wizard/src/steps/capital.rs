//! Step 2: how much to allocate, and in which mode.

use super::vocab::{self, CAPITAL_BANDS, MODE_RULES};
use super::{Prompt, ValidationOutcome};
use crate::model::{ConfigPatch, ConversationState, TradingMode};
use crate::tables::WizardTables;

pub fn prompt(state: &ConversationState) -> Prompt {
    let text = if state.is_beginner() {
        "Great place to start! Your bot will trade with simulated funds so you can learn \
         without risking real money. How much would you like to allocate?"
    } else {
        "How much capital would you like to allocate to this bot?"
    };
    let labels: Vec<&str> = CAPITAL_BANDS.iter().map(|(label, _)| *label).collect();
    Prompt::new(text).with_options(&labels)
}

pub fn extract(input: &str, state: &ConversationState) -> ConfigPatch {
    let capital_allocated =
        vocab::quick_reply(&CAPITAL_BANDS, input).or_else(|| vocab::first_amount(input));
    let requested = vocab::first_match(&MODE_RULES, input);
    let trading_mode = if state.is_beginner() {
        requested.or(Some(TradingMode::Paper))
    } else {
        requested
    };

    ConfigPatch {
        capital_allocated,
        trading_mode,
        ..Default::default()
    }
}

pub fn validate(
    tables: &WizardTables,
    patch: &ConfigPatch,
    state: &ConversationState,
) -> Option<ValidationOutcome> {
    let policy = &tables.policy;
    let Some(capital) = state.config.capital_allocated else {
        return Some(ValidationOutcome::error(
            "I didn't catch an amount. How much would you like to allocate? For example: $500.",
        ));
    };
    if capital < policy.min_capital {
        return Some(ValidationOutcome::error(format!(
            "The minimum allocation is ${}. Please enter at least ${}.",
            policy.min_capital, policy.min_capital
        )));
    }

    let mut findings = Vec::new();

    let strategy = tables.strategies.get(state.effective_strategy());
    if capital < strategy.min_capital {
        findings.push(ValidationOutcome::warning(format!(
            "{} works best with at least ${}. You can continue with ${capital}, \
             but the bot will have less room to spread its trades.",
            strategy.display_name, strategy.min_capital
        )));
    }

    if state.is_beginner() {
        let paper = ConfigPatch {
            trading_mode: Some(TradingMode::Paper),
            ..Default::default()
        };
        if capital > policy.beginner_capital_ceiling {
            findings.push(
                ValidationOutcome::warning(format!(
                    "${capital} is a large amount for a first bot. I recommend paper trading \
                     until you're comfortable with how it behaves."
                ))
                .with_suggestion(paper.clone()),
            );
        }
        if patch.trading_mode == Some(TradingMode::Live) {
            findings.push(
                ValidationOutcome::warning(
                    "Live trading isn't available while you're learning, so your bot will run \
                     in paper mode.",
                )
                .with_suggestion(paper),
            );
        }
    }

    ValidationOutcome::combine(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExperienceLevel, StrategyKind};
    use crate::steps::Severity;
    use rust_decimal_macros::dec;

    fn merged(state: &ConversationState, patch: &ConfigPatch) -> ConversationState {
        let mut next = state.clone();
        next.apply(patch);
        next
    }

    fn beginner() -> ConversationState {
        let mut state = ConversationState::new();
        state.hints.experience_level = ExperienceLevel::Beginner;
        state
    }

    #[test]
    fn test_band_maps_to_midpoint() {
        let state = ConversationState::new();
        assert_eq!(extract("$100 - $500", &state).capital_allocated, Some(dec!(300)));
        assert_eq!(extract("$500 - $2,000", &state).capital_allocated, Some(dec!(1000)));
        assert_eq!(extract("$2,000 - $5,000", &state).capital_allocated, Some(dec!(3000)));
    }

    #[test]
    fn test_free_text_amount() {
        let patch = extract("let's say $1,250 for now", &ConversationState::new());
        assert_eq!(patch.capital_allocated, Some(dec!(1250)));
        assert_eq!(patch.trading_mode, None);
    }

    #[test]
    fn test_beginner_forced_to_paper() {
        let patch = extract("500", &beginner());
        assert_eq!(patch.trading_mode, Some(TradingMode::Paper));
    }

    #[test]
    fn test_below_floor_blocks() {
        let tables = WizardTables::default();
        let state = ConversationState::new();
        let patch = extract("$5", &state);
        let outcome = validate(&tables, &patch, &merged(&state, &patch)).unwrap();
        assert_eq!(outcome.severity, Severity::Error);
        assert!(!outcome.allow_proceed);
    }

    #[test]
    fn test_missing_amount_blocks() {
        let tables = WizardTables::default();
        let state = ConversationState::new();
        let patch = extract("not sure yet", &state);
        let outcome = validate(&tables, &patch, &merged(&state, &patch)).unwrap();
        assert!(outcome.is_blocking());
    }

    #[test]
    fn test_below_strategy_minimum_warns() {
        let tables = WizardTables::default();
        let mut state = ConversationState::new();
        state.hints.suggested_strategy = Some(StrategyKind::Grid);
        let patch = extract("$50", &state);
        let outcome = validate(&tables, &patch, &merged(&state, &patch)).unwrap();
        assert_eq!(outcome.severity, Severity::Warning);
        assert!(outcome.allow_proceed);
        assert!(outcome.message.contains("Grid Trading"));
    }

    #[test]
    fn test_beginner_with_large_capital() {
        let tables = WizardTables::default();
        let state = beginner();
        let patch = extract("I want to use real money, $3,000", &state);
        assert_eq!(patch.trading_mode, Some(TradingMode::Live));
        let outcome = validate(&tables, &patch, &merged(&state, &patch)).unwrap();
        assert!(outcome.allow_proceed);
        assert_eq!(outcome.severity, Severity::Warning);
        assert_eq!(
            outcome.suggested_value.and_then(|p| p.trading_mode),
            Some(TradingMode::Paper)
        );
        assert_eq!(outcome.message.split("\n\n").count(), 2);
    }

    #[test]
    fn test_comfortable_amount_passes() {
        let tables = WizardTables::default();
        let state = ConversationState::new();
        let patch = extract("$500 - $2,000", &state);
        assert!(validate(&tables, &patch, &merged(&state, &patch)).is_none());
    }
}
