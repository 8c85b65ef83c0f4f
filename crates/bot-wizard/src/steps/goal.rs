//! Step 1: what the bot is for.

use super::Prompt;
use super::vocab::{self, EXPERIENCE_RULES, GOAL_OPTIONS, GOAL_STRATEGY_RULES};
use crate::model::{ConfigPatch, ConversationState};

pub fn prompt(state: &ConversationState) -> Prompt {
    let text = if state.config.trading_goal.is_some() {
        "Let's pick up where we left off. What would you like your trading bot to achieve?"
    } else {
        "Hi! I'll help you set up a paper trading bot in a few quick steps. \
         What would you like your bot to achieve?"
    };
    Prompt::new(text).with_options(&GOAL_OPTIONS)
}

pub fn extract(input: &str, _state: &ConversationState) -> ConfigPatch {
    let goal = input.trim();
    ConfigPatch {
        trading_goal: (!goal.is_empty()).then(|| goal.to_string()),
        experience_level: vocab::first_match(&EXPERIENCE_RULES, input),
        suggested_strategy: vocab::first_match(&GOAL_STRATEGY_RULES, input),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExperienceLevel, StrategyKind};

    #[test]
    fn test_wealth_suggests_dca() {
        let patch = extract("Build wealth over time", &ConversationState::new());
        assert_eq!(patch.trading_goal.as_deref(), Some("Build wealth over time"));
        assert_eq!(patch.suggested_strategy, Some(StrategyKind::Dca));
        assert_eq!(patch.experience_level, None);
    }

    #[test]
    fn test_quick_options_resolve() {
        let state = ConversationState::new();
        assert_eq!(
            extract("Profit from volatility", &state).suggested_strategy,
            Some(StrategyKind::Grid)
        );
        assert_eq!(
            extract("Ride market trends", &state).suggested_strategy,
            Some(StrategyKind::Momentum)
        );
        let newcomer = extract("I'm new to trading", &state);
        assert_eq!(newcomer.experience_level, Some(ExperienceLevel::Beginner));
        assert_eq!(newcomer.suggested_strategy, None);
    }

    #[test]
    fn test_experienced_trader() {
        let patch = extract(
            "I'm an experienced trader looking for momentum plays",
            &ConversationState::new(),
        );
        assert_eq!(patch.experience_level, Some(ExperienceLevel::Advanced));
        assert_eq!(patch.suggested_strategy, Some(StrategyKind::Momentum));
    }

    #[test]
    fn test_blank_input_sets_nothing() {
        assert!(extract("   ", &ConversationState::new()).is_empty());
    }

    #[test]
    fn test_prompt_offers_goals() {
        let prompt = prompt(&ConversationState::new());
        assert_eq!(prompt.quick_options.map(|o| o.len()), Some(4));
    }
}
