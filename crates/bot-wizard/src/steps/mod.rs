//! Conversation Step Definitions
//!
//! Each of the five steps is a set of pure functions behind [`StepOracle`]:
//! `prompt` renders the question, `extract` turns a reply into a
//! [`ConfigPatch`], and `validate` decides whether the merged result may
//! proceed. The engine never looks inside a step.

mod capital;
mod goal;
mod review;
mod risk;
mod rules;
mod strategy;
pub(crate) mod vocab;

pub use rules::RuleBook;

use serde::{Deserialize, Serialize};

use crate::model::{ConfigPatch, ConversationState, Step};

/// Question text plus the quick replies offered with it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub text: String,
    /// `None` when only free text makes sense
    pub quick_options: Option<Vec<String>>,
}

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quick_options: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.quick_options = Some(options.iter().map(|o| (*o).to_string()).collect());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Verdict on a merged reply
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub severity: Severity,
    pub message: String,
    /// `false` keeps the conversation on the same step
    pub allow_proceed: bool,
    /// Override applied on top of the extracted values when proceeding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_value: Option<ConfigPatch>,
}

impl ValidationOutcome {
    /// Blocking error
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            allow_proceed: false,
            suggested_value: None,
        }
    }

    /// Non-blocking warning
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            allow_proceed: true,
            suggested_value: None,
        }
    }

    /// Blocking informational re-prompt
    pub fn hold(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            allow_proceed: false,
            suggested_value: None,
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, patch: ConfigPatch) -> Self {
        self.suggested_value = Some(patch);
        self
    }

    pub const fn is_blocking(&self) -> bool {
        !self.allow_proceed
    }

    /// Fold several findings into one: highest severity wins, any block blocks,
    /// messages are kept in order and suggestions are overlaid.
    pub fn combine(outcomes: impl IntoIterator<Item = Self>) -> Option<Self> {
        outcomes.into_iter().reduce(|acc, next| Self {
            severity: acc.severity.max(next.severity),
            message: format!("{}\n\n{}", acc.message, next.message),
            allow_proceed: acc.allow_proceed && next.allow_proceed,
            suggested_value: match (acc.suggested_value, next.suggested_value) {
                (Some(a), Some(b)) => Some(a.overlay(&b)),
                (a, b) => a.or(b),
            },
        })
    }
}

/// Source of prompts, extraction and validation for every step.
///
/// Implementations must be pure: the same step, input and state always
/// yield the same result.
pub trait StepOracle: Send + Sync {
    fn prompt(&self, step: Step, state: &ConversationState) -> Prompt;

    /// Never fails; unrecognised input leaves fields unset
    fn extract(&self, step: Step, input: &str, state: &ConversationState) -> ConfigPatch;

    /// `state` already has `patch` merged in
    fn validate(
        &self,
        step: Step,
        patch: &ConfigPatch,
        state: &ConversationState,
    ) -> Option<ValidationOutcome>;

    /// Whether `input` asks to throw the conversation away
    fn wants_restart(&self, _step: Step, _input: &str) -> bool {
        false
    }
}
