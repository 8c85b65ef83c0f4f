//! Step 5: final review.
//!
//! Only an explicit deploy phrase changes anything here; questions about
//! deploying never count as a go-ahead. Creating the bot and
//! closing the conversation happen elsewhere, after the bot is persisted.

use std::fmt::Write as _;

use super::vocab::{self, CHANGE_PHRASES, DEPLOY, DEPLOY_PHRASES, MAKE_CHANGES, START_OVER};
use super::{Prompt, ValidationOutcome};
use crate::model::{ConfigPatch, ConversationState, ReplyIntent, TradingMode};
use crate::tables::WizardTables;

fn summary(tables: &WizardTables, state: &ConversationState) -> String {
    let config = &state.config;
    let mut out = String::from("Here's your bot:\n");
    if let Some(name) = &config.name {
        let _ = writeln!(out, "- Name: {name}");
    }
    let strategy = tables.strategies.get(state.effective_strategy());
    let _ = writeln!(out, "- Strategy: {}", strategy.display_name);
    if let Some(params) = &config.strategy_params {
        let _ = writeln!(out, "- Plan: {}", params.summary());
    }
    if let Some(pair) = &config.trading_pair {
        let _ = writeln!(out, "- Pair: {pair}");
    }
    if let Some(capital) = config.capital_allocated {
        let _ = writeln!(out, "- Capital: ${capital}");
    }
    let mode = match config.trading_mode {
        TradingMode::Paper => "paper (simulated funds)",
        TradingMode::Live => "live",
    };
    let _ = writeln!(out, "- Mode: {mode}");
    if let (Some(level), Some(limits)) = (config.risk_level, config.risk_limits()) {
        let _ = writeln!(
            out,
            "- Risk: {level} ({}% stop-loss, {}% take-profit, ${} max daily loss, {}% max position)",
            limits.stop_loss_percentage,
            limits.take_profit_percentage,
            limits.max_daily_loss,
            limits.max_position_size
        );
    }
    out
}

pub fn prompt(tables: &WizardTables, state: &ConversationState) -> Prompt {
    if state.ready_to_deploy {
        return Prompt::new(
            "Your bot is ready! I've prepared three versions of it, from conservative to \
             aggressive. Pick the one that fits you best to create it.",
        );
    }
    Prompt::new(format!("{}\nReady to deploy it?", summary(tables, state)))
        .with_options(&[DEPLOY, MAKE_CHANGES, START_OVER])
}

pub fn extract(input: &str) -> ConfigPatch {
    let trimmed = input.trim();
    let intent = if trimmed.eq_ignore_ascii_case(DEPLOY) {
        Some(ReplyIntent::Affirmed)
    } else if trimmed.eq_ignore_ascii_case(MAKE_CHANGES) || vocab::mentions(input, &CHANGE_PHRASES)
    {
        Some(ReplyIntent::ChangesRequested)
    } else if vocab::is_question(input) {
        None
    } else if vocab::negates(input) {
        Some(ReplyIntent::Declined)
    } else if vocab::mentions(input, &DEPLOY_PHRASES) {
        Some(ReplyIntent::Affirmed)
    } else {
        None
    };

    ConfigPatch {
        ready_to_deploy: (intent == Some(ReplyIntent::Affirmed)).then_some(true),
        intent,
        ..Default::default()
    }
}

pub fn validate(patch: &ConfigPatch, state: &ConversationState) -> Option<ValidationOutcome> {
    match patch.intent {
        Some(ReplyIntent::Affirmed) => None,
        Some(ReplyIntent::ChangesRequested) => Some(ValidationOutcome::hold(format!(
            "Editing single answers isn't available in guided mode yet. Choose \"{START_OVER}\" \
             to answer the questions again, or \"{DEPLOY}\" to keep this setup."
        ))),
        _ if state.ready_to_deploy => Some(ValidationOutcome::hold(
            "Pick one of the three bots above and I'll create it for you.",
        )),
        _ => Some(ValidationOutcome::hold(format!(
            "Take your time. Say \"{DEPLOY}\" whenever you're ready."
        ))),
    }
}

pub fn is_restart(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(START_OVER)
}
