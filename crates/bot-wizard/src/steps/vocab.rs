//! Fixed vocabulary used by the rule book.
//!
//! Keyword inference is an ordered list of [`KeywordRule`]s: the first rule
//! with a matching phrase wins, no match leaves the field unset. Phrases match
//! whole words (multi-word phrases match contiguous words), case-insensitively.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::model::{ExperienceLevel, RiskLevel, StrategyKind, TradingMode};

pub struct KeywordRule<T> {
    pub phrases: &'static [&'static str],
    pub value: T,
}

const fn rule<T>(phrases: &'static [&'static str], value: T) -> KeywordRule<T> {
    KeywordRule { phrases, value }
}

/// Lowercased words of `input`; apostrophes stay inside words ("don't")
pub fn words(input: &str) -> Vec<String> {
    input
        .to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .filter(|w| !w.is_empty())
        .map(|w| w.replace('\u{2019}', "'"))
        .collect()
}

fn contains_phrase(words: &[String], phrase: &str) -> bool {
    let needle: Vec<&str> = phrase.split_whitespace().collect();
    if needle.is_empty() || needle.len() > words.len() {
        return false;
    }
    words
        .windows(needle.len())
        .any(|window| window.iter().zip(&needle).all(|(w, n)| w.as_str() == *n))
}

/// True if any phrase occurs in `input`
pub fn mentions(input: &str, phrases: &[&str]) -> bool {
    let words = words(input);
    phrases.iter().any(|p| contains_phrase(&words, p))
}

/// Value of the first rule with a phrase present in `input`
pub fn first_match<T: Copy>(rules: &[KeywordRule<T>], input: &str) -> Option<T> {
    let words = words(input);
    rules
        .iter()
        .find(|r| r.phrases.iter().any(|p| contains_phrase(&words, p)))
        .map(|r| r.value)
}

/// Exact quick-reply lookup (trimmed, case-insensitive)
pub fn quick_reply<T: Copy>(table: &[(&str, T)], input: &str) -> Option<T> {
    let input = input.trim();
    table
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(input))
        .map(|(_, value)| *value)
}

// Thousands groups must be tried before bare digits, or "2500" would stop at "250".
static CURRENCY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(-\s*)?\$?((?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?)")
        .expect("Invalid currency regex")
});

/// First currency-looking amount in `input`; a leading minus keeps its sign
pub fn first_amount(input: &str) -> Option<Decimal> {
    let captures = CURRENCY.captures(input)?;
    let digits = captures.get(2)?.as_str().replace(',', "");
    let amount = Decimal::from_str(&digits).ok()?;
    Some(if captures.get(1).is_some() { -amount } else { amount })
}

/// Words that open a question rather than an answer
const QUESTION_WORDS: [&str; 16] = [
    "how", "what", "when", "why", "where", "which", "who", "can", "could", "should", "would",
    "will", "do", "does", "is", "are",
];

/// Questions never count as answers to a yes/no prompt
pub fn is_question(input: &str) -> bool {
    let trimmed = input.trim();
    trimmed.ends_with('?')
        || words(trimmed)
            .first()
            .is_some_and(|w| QUESTION_WORDS.contains(&w.as_str()))
}

fn strip_phrase(words: &mut Vec<String>, phrase: &str) {
    let needle: Vec<&str> = phrase.split_whitespace().collect();
    let mut i = 0;
    while i + needle.len() <= words.len() {
        if words[i..i + needle.len()]
            .iter()
            .zip(&needle)
            .all(|(w, n)| w.as_str() == *n)
        {
            words.drain(i..i + needle.len());
        } else {
            i += 1;
        }
    }
}

/// True if `input` says no; "no problem" and friends are agreement
pub fn negates(input: &str) -> bool {
    let mut words = words(input);
    for idiom in AFFIRMING_IDIOMS {
        strip_phrase(&mut words, idiom);
    }
    NEGATION_PHRASES.iter().any(|p| contains_phrase(&words, p))
}

// Step 1

pub const GOAL_OPTIONS: [&str; 4] = [
    "Build wealth over time",
    "Profit from volatility",
    "Ride market trends",
    "I'm new to trading",
];

pub const EXPERIENCE_RULES: [KeywordRule<ExperienceLevel>; 3] = [
    rule(
        &["new", "first time", "beginner", "never traded", "just starting"],
        ExperienceLevel::Beginner,
    ),
    rule(
        &["experienced", "advanced", "pro", "expert", "professional"],
        ExperienceLevel::Advanced,
    ),
    rule(&["some experience", "intermediate"], ExperienceLevel::Intermediate),
];

pub const GOAL_STRATEGY_RULES: [KeywordRule<StrategyKind>; 4] = [
    rule(
        &["long", "long term", "wealth", "save", "savings", "retire", "retirement"],
        StrategyKind::Dca,
    ),
    rule(
        &["volatility", "volatile", "range", "sideways", "swings"],
        StrategyKind::Grid,
    ),
    rule(&["trend", "trends", "momentum", "breakout"], StrategyKind::Momentum),
    rule(
        &["mean reversion", "revert", "reversion", "dips", "buy the dip"],
        StrategyKind::MeanReversion,
    ),
];

// Step 2

pub const CAPITAL_BANDS: [(&str, Decimal); 3] = [
    ("$100 - $500", dec!(300)),
    ("$500 - $2,000", dec!(1000)),
    ("$2,000 - $5,000", dec!(3000)),
];

pub const MODE_RULES: [KeywordRule<TradingMode>; 2] = [
    rule(
        &["paper", "simulated", "simulation", "practice", "test money"],
        TradingMode::Paper,
    ),
    rule(&["live", "real money", "real funds"], TradingMode::Live),
];

// Step 3

pub const RISK_OPTIONS: [(&str, RiskLevel); 3] = [
    ("Very cautious - Protect my capital", RiskLevel::Low),
    ("Balanced - Moderate growth", RiskLevel::Medium),
    ("Aggressive - Maximum returns", RiskLevel::High),
];

pub const RISK_RULES: [KeywordRule<RiskLevel>; 3] = [
    rule(
        &["cautious", "protect", "conservative", "safe", "low risk", "careful"],
        RiskLevel::Low,
    ),
    rule(&["balanced", "moderate", "medium", "middle"], RiskLevel::Medium),
    rule(
        &["aggressive", "high risk", "maximum", "max returns", "risky"],
        RiskLevel::High,
    ),
];

// Step 4

pub const CONFIRM_STRATEGY: &str = "Yes, sounds good!";
pub const OTHER_STRATEGY: &str = "Use a different strategy";

pub const ALTERNATIVE_PHRASES: [&str; 5] = [
    "different strategy",
    "another strategy",
    "other strategy",
    "something else",
    "alternative",
];

pub const AFFIRM_PHRASES: [&str; 14] = [
    "yes",
    "yeah",
    "yep",
    "sure",
    "ok",
    "okay",
    "sounds good",
    "looks good",
    "confirm",
    "agree",
    "go ahead",
    "let's go",
    "no problem",
    "no worries",
];

const AFFIRMING_IDIOMS: [&str; 3] = ["no problem", "no worries", "not a problem"];

pub const NEGATION_PHRASES: [&str; 8] = [
    "no", "not", "don't", "dont", "nope", "wait", "later", "cancel",
];

// Step 5

pub const DEPLOY: &str = "Deploy Bot!";
pub const MAKE_CHANGES: &str = "Make changes";
pub const START_OVER: &str = "Start over";

pub const DEPLOY_PHRASES: [&str; 8] = [
    "deploy",
    "launch",
    "create it",
    "create the bot",
    "start the bot",
    "yes",
    "let's go",
    "i'm ready",
];

pub const CHANGE_PHRASES: [&str; 5] = ["change", "changes", "edit", "modify", "adjust"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_prefers_thousands_groups() {
        assert_eq!(first_amount("about $2,500 to start"), Some(dec!(2500)));
        assert_eq!(first_amount("2500"), Some(dec!(2500)));
        assert_eq!(first_amount("$12.50 please"), Some(dec!(12.50)));
        assert_eq!(first_amount("between 500 and 2000"), Some(dec!(500)));
        assert_eq!(first_amount("not much"), None);
    }

    #[test]
    fn test_negative_amount_keeps_sign() {
        assert_eq!(first_amount("-$50"), Some(dec!(-50)));
        assert_eq!(first_amount("- 1,000"), Some(dec!(-1000)));
        assert_eq!(first_amount("$100-$500"), Some(dec!(100)));
    }

    #[test]
    fn test_questions() {
        assert!(is_question("How do I deploy this?"));
        assert!(is_question("should I deploy now"));
        assert!(is_question("deploy?"));
        assert!(!is_question("Deploy Bot!"));
        assert!(!is_question("yes, launch it"));
    }

    #[test]
    fn test_keywords_match_whole_words() {
        assert_eq!(first_match(&EXPERIENCE_RULES, "Profit from volatility"), None);
        assert_eq!(
            first_match(&EXPERIENCE_RULES, "I'm new to trading"),
            Some(ExperienceLevel::Beginner)
        );
        assert_eq!(
            first_match(&EXPERIENCE_RULES, "This is my FIRST TIME"),
            Some(ExperienceLevel::Beginner)
        );
    }

    #[test]
    fn test_rules_follow_priority() {
        // "long" (dca) outranks "trend" (momentum)
        assert_eq!(
            first_match(&GOAL_STRATEGY_RULES, "follow the long-term trend"),
            Some(StrategyKind::Dca)
        );
        assert_eq!(
            first_match(&GOAL_STRATEGY_RULES, "catch momentum moves"),
            Some(StrategyKind::Momentum)
        );
    }

    #[test]
    fn test_quick_reply_exact() {
        assert_eq!(quick_reply(&CAPITAL_BANDS, " $500 - $2,000 "), Some(dec!(1000)));
        assert_eq!(quick_reply(&CAPITAL_BANDS, "$500-$2,000"), None);
    }

    #[test]
    fn test_negation_words() {
        assert!(mentions("Don't deploy yet", &NEGATION_PHRASES));
        assert!(mentions("don\u{2019}t deploy yet", &NEGATION_PHRASES));
        assert!(!mentions("Deploy Bot!", &NEGATION_PHRASES));
    }

    #[test]
    fn test_affirming_idioms_are_not_negations() {
        assert!(!negates("Sure, no problem!"));
        assert!(!negates("no worries, go ahead"));
        assert!(negates("no, not yet"));
        assert!(negates("no problem, but wait"));
    }
}
