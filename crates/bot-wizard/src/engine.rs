//! Conversation Engine
//!
//! A linear state machine over the five steps. Each call to
//! [`ConversationEngine::advance`] takes the current state and one user reply
//! and returns a new state; nothing is mutated in place and nothing is shared
//! between conversations. Callers must serialize turns per conversation.

use std::sync::Arc;

use chat_core::{Message, QuickReply};

use crate::derivation::ConfigurationDeriver;
use crate::error::Result;
use crate::model::{BotOptionVariant, ConfigPatch, ConversationState, Step};
use crate::steps::{Prompt, RuleBook, StepOracle, ValidationOutcome};
use crate::tables::WizardTables;

/// Outcome of one user turn
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    /// Step the conversation is on after this turn
    pub step: Step,
    pub prompt: Prompt,
    /// Message to surface before the prompt, if any
    pub validation: Option<ValidationOutcome>,
    pub state: ConversationState,
    /// Fields committed by this turn, overrides included
    pub extracted: ConfigPatch,
    /// Present only on the turn that confirms deployment
    pub recommendations: Option<Vec<BotOptionVariant>>,
    pub restarted: bool,
}

impl Turn {
    /// Assistant text: validation message (if any) followed by the prompt
    pub fn reply_text(&self) -> String {
        match &self.validation {
            Some(outcome) => format!("{}\n\n{}", outcome.message, self.prompt.text),
            None => self.prompt.text.clone(),
        }
    }

    pub fn quick_replies(&self) -> Vec<QuickReply> {
        self.prompt
            .quick_options
            .iter()
            .flatten()
            .map(QuickReply::from_label)
            .collect()
    }

    /// The assistant message for the transcript
    pub fn to_message(&self) -> Message {
        Message::assistant(self.reply_text())
            .with_quick_replies(self.prompt.quick_options.clone().unwrap_or_default())
    }

    /// Whether this turn stayed on its step because validation blocked it
    pub fn was_held(&self) -> bool {
        self.validation
            .as_ref()
            .is_some_and(ValidationOutcome::is_blocking)
    }
}

/// Drives a conversation through the step definitions of an oracle
pub struct ConversationEngine<O = RuleBook> {
    oracle: O,
    deriver: ConfigurationDeriver,
}

impl ConversationEngine<RuleBook> {
    /// Engine backed by the keyword rule book
    pub fn new(tables: Arc<WizardTables>) -> Self {
        Self::with_oracle(RuleBook::new(Arc::clone(&tables)), tables)
    }
}

impl Default for ConversationEngine<RuleBook> {
    fn default() -> Self {
        Self::new(Arc::new(WizardTables::default()))
    }
}

impl<O: StepOracle> ConversationEngine<O> {
    pub fn with_oracle(oracle: O, tables: Arc<WizardTables>) -> Self {
        Self {
            oracle,
            deriver: ConfigurationDeriver::new(tables),
        }
    }

    pub const fn oracle(&self) -> &O {
        &self.oracle
    }

    pub const fn deriver(&self) -> &ConfigurationDeriver {
        &self.deriver
    }

    fn opening(&self, restarted: bool) -> Turn {
        let state = ConversationState::new();
        Turn {
            step: Step::Goal,
            prompt: self.oracle.prompt(Step::Goal, &state),
            validation: None,
            state,
            extracted: ConfigPatch::default(),
            recommendations: None,
            restarted,
        }
    }

    /// Fresh conversation with the first question
    pub fn start(&self) -> Turn {
        self.opening(false)
    }

    /// Throw the current state away and start again at step 1
    pub fn restart(&self) -> Turn {
        tracing::debug!("Conversation restarted");
        self.opening(true)
    }

    /// Question for the state's current step
    pub fn prompt(&self, state: &ConversationState) -> Result<Prompt> {
        Ok(self.oracle.prompt(state.step()?, state))
    }

    /// Process one user reply.
    ///
    /// Fails only when `state.current_step` is outside 1..=5 or a reviewed
    /// state cannot be derived; everything the user types is handled in-band.
    pub fn advance(&self, state: &ConversationState, input: &str) -> Result<Turn> {
        let step = state.step()?;

        if self.oracle.wants_restart(step, input) {
            return Ok(self.restart());
        }

        let mut extracted = self.oracle.extract(step, input, state);
        let mut next = state.clone();
        next.apply(&extracted);
        let validation = self.oracle.validate(step, &extracted, &next);

        if validation.as_ref().is_some_and(ValidationOutcome::is_blocking) {
            tracing::debug!(step = step.number(), "Turn held by validation");
            return Ok(Turn {
                step,
                prompt: self.oracle.prompt(step, state),
                validation,
                state: state.clone(),
                extracted: ConfigPatch::default(),
                recommendations: None,
                restarted: false,
            });
        }

        if let Some(overrides) = validation.as_ref().and_then(|v| v.suggested_value.as_ref()) {
            tracing::debug!(step = step.number(), "Applying validation override");
            next.apply(overrides);
            extracted = extracted.overlay(overrides);
        }

        let next_step = step.next();
        next.current_step = next_step.number();

        let confirmed = step.is_terminal() && !state.ready_to_deploy && next.ready_to_deploy;
        let recommendations = if confirmed {
            Some(self.deriver.derive(&next)?)
        } else {
            None
        };

        tracing::debug!(
            step = step.number(),
            next_step = next_step.number(),
            warned = validation.is_some(),
            "Conversation advanced"
        );

        Ok(Turn {
            step: next_step,
            prompt: self.oracle.prompt(next_step, &next),
            validation,
            state: next,
            extracted,
            recommendations,
            restarted: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WizardError;
    use crate::model::{ExperienceLevel, RiskLevel, StrategyKind, TradingMode};
    use crate::steps::Severity;
    use rust_decimal_macros::dec;

    fn run(engine: &ConversationEngine, replies: &[&str]) -> Turn {
        let mut turn = engine.start();
        for reply in replies {
            turn = engine.advance(&turn.state, reply).unwrap();
        }
        turn
    }

    #[test]
    fn test_round_trip() {
        let engine = ConversationEngine::default();
        let mut state = ConversationState::new();
        let replies = [
            "Build wealth over time",
            "$500 - $2,000",
            "Very cautious - Protect my capital",
            "Yes, sounds good!",
        ];
        for reply in replies {
            state = engine.advance(&state, reply).unwrap().state;
        }
        assert_eq!(state.current_step, 5);
        assert_eq!(state.hints.suggested_strategy, Some(StrategyKind::Dca));
        assert_eq!(state.config.capital_allocated, Some(dec!(1000)));
        assert_eq!(state.config.risk_level, Some(RiskLevel::Low));
        assert_eq!(state.config.stop_loss_percentage, Some(dec!(3)));
        assert_eq!(state.config.take_profit_percentage, Some(dec!(5)));
        assert_eq!(state.config.max_daily_loss, Some(dec!(20)));
        assert_eq!(state.config.max_position_size, Some(dec!(25)));
        assert_eq!(state.config.trading_pair.as_deref(), Some("BTC/USDT"));
        assert_eq!(state.config.strategy_type, Some(StrategyKind::Dca));
        assert_eq!(state.config.name.as_deref(), Some("DCA BTC Bot"));
        assert!(!state.ready_to_deploy);

        let last = engine.advance(&state, "Deploy Bot!").unwrap();
        assert!(last.state.ready_to_deploy);
        assert_eq!(last.step, Step::Review);
        assert_eq!(last.extracted.ready_to_deploy, Some(true));
        let recommendations = last.recommendations.unwrap();
        assert_eq!(recommendations.len(), 3);
        assert!(last.prompt.quick_options.is_none());
    }

    #[test]
    fn test_advance_is_deterministic() {
        let engine = ConversationEngine::default();
        let state = run(&engine, &["I'm new to trading"]).state;
        let a = engine.advance(&state, "$2,500 please, real money").unwrap();
        let b = engine.advance(&state, "$2,500 please, real money").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_step_moves_by_at_most_one() {
        let engine = ConversationEngine::default();
        let replies = [
            "hello",
            "no idea",
            "$40",
            "whatever",
            "balanced",
            "nah",
            "yes",
            "hmm",
            "Deploy Bot!",
        ];
        let mut state = ConversationState::new();
        for reply in replies {
            let turn = engine.advance(&state, reply).unwrap();
            assert!(turn.state.current_step >= state.current_step);
            let delta = turn.state.current_step - state.current_step;
            assert!(delta <= 1, "jumped from {} on {reply:?}", state.current_step);
            state = turn.state;
        }
        assert_eq!(state.current_step, 5);
        assert!(state.ready_to_deploy);
    }

    #[test]
    fn test_tiny_capital_blocks() {
        let engine = ConversationEngine::default();
        let state = run(&engine, &["Build wealth over time"]).state;
        let turn = engine.advance(&state, "$5").unwrap();
        assert!(turn.was_held());
        assert_eq!(turn.step, Step::Capital);
        assert_eq!(turn.state, state);
        assert_eq!(turn.validation.unwrap().severity, Severity::Error);
        assert!(turn.extracted.is_empty());
    }

    #[test]
    fn test_negative_capital_blocks() {
        let engine = ConversationEngine::default();
        let state = run(&engine, &["Build wealth over time"]).state;
        let turn = engine.advance(&state, "-$50").unwrap();
        assert!(turn.was_held());
        assert_eq!(turn.step, Step::Capital);
        assert_eq!(turn.state.config.capital_allocated, None);
    }

    #[test]
    fn test_beginner_never_runs_high_risk() {
        let engine = ConversationEngine::default();
        let turn = run(
            &engine,
            &["I'm new to trading", "$500", "Aggressive - Maximum returns"],
        );
        assert_eq!(turn.step, Step::Strategy);
        assert_eq!(turn.state.hints.experience_level, ExperienceLevel::Beginner);
        assert_eq!(turn.state.config.risk_level, Some(RiskLevel::Medium));
        assert_eq!(turn.state.config.stop_loss_percentage, Some(dec!(5)));
        assert_eq!(turn.state.config.max_daily_loss, Some(dec!(25)));
        assert_eq!(turn.extracted.risk_level, Some(RiskLevel::Medium));
        assert_eq!(turn.validation.as_ref().map(|v| v.severity), Some(Severity::Warning));
        assert!(turn.reply_text().starts_with("Since you're new"));
    }

    #[test]
    fn test_beginner_kept_on_paper() {
        let engine = ConversationEngine::default();
        let turn = run(&engine, &["I'm new to trading", "live trading with $3,000"]);
        assert_eq!(turn.step, Step::Risk);
        assert_eq!(turn.state.config.trading_mode, TradingMode::Paper);
        assert!(turn.validation.is_some_and(|v| v.allow_proceed));
    }

    #[test]
    fn test_review_waits_for_deploy() {
        let engine = ConversationEngine::default();
        let mut turn = run(
            &engine,
            &["Build wealth over time", "$1000", "balanced", "Yes, sounds good!"],
        );
        for reply in [
            "what is a stop-loss?",
            "How do I deploy this?",
            "What happens when it's ready?",
            "Make changes",
            "not yet",
        ] {
            turn = engine.advance(&turn.state, reply).unwrap();
            assert_eq!(turn.step, Step::Review);
            assert!(!turn.state.ready_to_deploy);
            assert!(turn.recommendations.is_none());
        }
    }

    #[test]
    fn test_small_capital_with_grid_warns() {
        let engine = ConversationEngine::default();
        let state = run(&engine, &["Profit from volatility"]).state;
        assert_eq!(state.hints.suggested_strategy, Some(StrategyKind::Grid));
        let turn = engine.advance(&state, "$50").unwrap();
        let validation = turn.validation.clone().unwrap();
        assert!(validation.allow_proceed);
        assert_eq!(validation.severity, Severity::Warning);
        assert_eq!(turn.step, Step::Risk);
        assert_eq!(turn.state.config.capital_allocated, Some(dec!(50)));
    }

    #[test]
    fn test_recommendations_only_once() {
        let engine = ConversationEngine::default();
        let turn = run(
            &engine,
            &["Build wealth over time", "$1000", "balanced", "yes", "Deploy Bot!"],
        );
        assert!(turn.recommendations.is_some());
        let again = engine.advance(&turn.state, "Deploy Bot!").unwrap();
        assert!(again.recommendations.is_none());
        assert!(again.state.ready_to_deploy);
    }

    #[test]
    fn test_start_over_restarts() {
        let engine = ConversationEngine::default();
        let turn = run(
            &engine,
            &["Build wealth over time", "$1000", "balanced", "yes", "Start over"],
        );
        assert!(turn.restarted);
        assert_eq!(turn.step, Step::Goal);
        assert_eq!(turn.state, ConversationState::new());
    }

    #[test]
    fn test_invalid_step_is_fatal() {
        let engine = ConversationEngine::default();
        let mut state = ConversationState::new();
        state.current_step = 7;
        let err = engine.advance(&state, "hello").unwrap_err();
        assert!(matches!(err, WizardError::InvalidStep(7)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_quick_replies_follow_prompt() {
        let engine = ConversationEngine::default();
        let turn = run(&engine, &["Build wealth over time"]);
        let replies = turn.quick_replies();
        assert_eq!(replies.len(), 3);
        assert_eq!(replies[1].id, "500-2000");
        assert_eq!(replies[1].value, "$500 - $2,000");
        assert_eq!(turn.to_message().quick_replies, replies);
    }

    struct Echo;

    impl StepOracle for Echo {
        fn prompt(&self, step: Step, _state: &ConversationState) -> Prompt {
            Prompt::new(format!("step {step}"))
        }

        fn extract(&self, _step: Step, input: &str, _state: &ConversationState) -> ConfigPatch {
            ConfigPatch {
                trading_goal: Some(input.to_string()),
                ..Default::default()
            }
        }

        fn validate(
            &self,
            _step: Step,
            _patch: &ConfigPatch,
            _state: &ConversationState,
        ) -> Option<ValidationOutcome> {
            None
        }
    }

    #[test]
    fn test_engine_accepts_other_oracles() {
        let engine = ConversationEngine::with_oracle(Echo, Arc::new(WizardTables::default()));
        let turn = engine.advance(&ConversationState::new(), "first").unwrap();
        let turn = engine.advance(&turn.state, "second").unwrap();
        assert_eq!(turn.step, Step::Risk);
        assert_eq!(turn.prompt.text, "step 3");
        assert_eq!(turn.state.config.trading_goal.as_deref(), Some("first"));
    }
}
