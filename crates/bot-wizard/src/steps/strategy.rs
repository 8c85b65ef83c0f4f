//! Step 4: confirm the suggested strategy and fill in its parameters.

use super::vocab::{self, AFFIRM_PHRASES, ALTERNATIVE_PHRASES, CONFIRM_STRATEGY, OTHER_STRATEGY};
use super::{Prompt, ValidationOutcome};
use crate::model::{ConfigPatch, ConversationState, ReplyIntent, StrategyKind};
use crate::tables::{base_asset, WizardTables};

pub fn prompt(tables: &WizardTables, state: &ConversationState) -> Prompt {
    let descriptor = tables.strategies.get(state.effective_strategy());
    let detail = state
        .config
        .capital_allocated
        .map(|capital| {
            let params = descriptor.defaults.scaled(capital);
            format!(" With your budget it {}.", params.summary())
        })
        .unwrap_or_default();
    Prompt::new(format!(
        "Based on what you've told me, I recommend {}: it {}.{detail}\n\nShall we go with it?",
        descriptor.display_name, descriptor.description
    ))
    .with_options(&[CONFIRM_STRATEGY, OTHER_STRATEGY])
}

fn classify(input: &str) -> Option<ReplyIntent> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case(CONFIRM_STRATEGY) {
        Some(ReplyIntent::Affirmed)
    } else if trimmed.eq_ignore_ascii_case(OTHER_STRATEGY)
        || vocab::mentions(input, &ALTERNATIVE_PHRASES)
    {
        Some(ReplyIntent::AlternativeRequested)
    } else if vocab::negates(input) {
        Some(ReplyIntent::Declined)
    } else if vocab::mentions(input, &AFFIRM_PHRASES) {
        Some(ReplyIntent::Affirmed)
    } else {
        None
    }
}

/// Bot name: `"<STRATEGY> <BASE> Bot"`
pub fn bot_name(kind: StrategyKind, trading_pair: &str) -> String {
    format!(
        "{} {} Bot",
        kind.as_str().to_uppercase(),
        base_asset(trading_pair)
    )
}

pub fn extract(tables: &WizardTables, input: &str, state: &ConversationState) -> ConfigPatch {
    let intent = classify(input);
    if intent != Some(ReplyIntent::Affirmed) {
        return ConfigPatch {
            intent,
            ..Default::default()
        };
    }

    let kind = state.effective_strategy();
    let pair = state
        .config
        .trading_pair
        .as_deref()
        .unwrap_or(tables.policy.default_trading_pair.as_str());
    ConfigPatch {
        strategy_type: Some(kind),
        strategy_params: state
            .config
            .capital_allocated
            .map(|capital| tables.strategies.params_for(kind, capital)),
        name: Some(bot_name(kind, pair)),
        intent,
        ..Default::default()
    }
}

pub fn validate(
    tables: &WizardTables,
    patch: &ConfigPatch,
    state: &ConversationState,
) -> Option<ValidationOutcome> {
    let suggested = &tables.strategies.get(state.effective_strategy()).display_name;
    match patch.intent {
        Some(ReplyIntent::Affirmed) if state.config.strategy_params.is_none() => {
            Some(ValidationOutcome::error(
                "I need your capital allocation before I can size this strategy.",
            ))
        }
        Some(ReplyIntent::Affirmed) => None,
        Some(ReplyIntent::AlternativeRequested) => Some(ValidationOutcome::hold(format!(
            "Picking a different strategy needs a custom setup that guided mode doesn't \
             cover yet. You can continue with {suggested}, or configure a bot manually instead."
        ))),
        _ => Some(ValidationOutcome::hold(format!(
            "No problem. Say \"{CONFIRM_STRATEGY}\" when you're ready to continue with \
             {suggested}, or ask for a different strategy."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StrategyParams;
    use crate::steps::Severity;
    use rust_decimal_macros::dec;

    fn ready_for_strategy() -> ConversationState {
        let mut state = ConversationState::new();
        state.current_step = 4;
        state.config.capital_allocated = Some(dec!(1000));
        state.config.trading_pair = Some("BTC/USDT".into());
        state
    }

    fn merged(state: &ConversationState, patch: &ConfigPatch) -> ConversationState {
        let mut next = state.clone();
        next.apply(patch);
        next
    }

    #[test]
    fn test_affirm_defaults_to_dca() {
        let tables = WizardTables::default();
        let state = ready_for_strategy();
        let patch = extract(&tables, "Yes, sounds good!", &state);
        assert_eq!(patch.strategy_type, Some(StrategyKind::Dca));
        assert_eq!(patch.name.as_deref(), Some("DCA BTC Bot"));
        assert_eq!(
            patch.strategy_params,
            Some(StrategyParams::Dca {
                buy_amount: dec!(50),
                interval_hours: 24,
                max_buys: None,
            })
        );
        assert!(validate(&tables, &patch, &merged(&state, &patch)).is_none());
    }

    #[test]
    fn test_affirm_uses_hint() {
        let tables = WizardTables::default();
        let mut state = ready_for_strategy();
        state.hints.suggested_strategy = Some(StrategyKind::Grid);
        let patch = extract(&tables, "ok let's do it", &state);
        assert_eq!(patch.strategy_type, Some(StrategyKind::Grid));
        assert_eq!(patch.name.as_deref(), Some("GRID BTC Bot"));
    }

    #[test]
    fn test_different_strategy_is_held() {
        let tables = WizardTables::default();
        let state = ready_for_strategy();
        let patch = extract(&tables, "Use a different strategy", &state);
        assert_eq!(patch.intent, Some(ReplyIntent::AlternativeRequested));
        assert!(patch.is_empty());
        let outcome = validate(&tables, &patch, &merged(&state, &patch)).unwrap();
        assert_eq!(outcome.severity, Severity::Info);
        assert!(outcome.is_blocking());
    }

    #[test]
    fn test_negative_reply_is_held() {
        let tables = WizardTables::default();
        let state = ready_for_strategy();
        let patch = extract(&tables, "no, not yet", &state);
        assert_eq!(patch.intent, Some(ReplyIntent::Declined));
        assert!(validate(&tables, &patch, &merged(&state, &patch)).unwrap().is_blocking());

        let unclear = extract(&tables, "hmm", &state);
        assert_eq!(unclear.intent, None);
        assert!(validate(&tables, &unclear, &merged(&state, &unclear)).unwrap().is_blocking());
    }

    #[test]
    fn test_no_problem_is_agreement() {
        let tables = WizardTables::default();
        let state = ready_for_strategy();
        let patch = extract(&tables, "Sure, no problem!", &state);
        assert_eq!(patch.intent, Some(ReplyIntent::Affirmed));
        assert_eq!(patch.strategy_type, Some(StrategyKind::Dca));
        assert!(validate(&tables, &patch, &merged(&state, &patch)).is_none());
    }

    #[test]
    fn test_prompt_previews_parameters() {
        let prompt = prompt(&WizardTables::default(), &ready_for_strategy());
        assert!(prompt.text.contains("Dollar-Cost Averaging"));
        assert!(prompt.text.contains("$50"));
    }
}
