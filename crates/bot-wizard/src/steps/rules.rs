//! Rule Book
//!
//! The canonical, keyword-driven [`StepOracle`].

use std::sync::Arc;

use super::{capital, goal, review, risk, strategy, Prompt, StepOracle, ValidationOutcome};
use crate::model::{ConfigPatch, ConversationState, Step};
use crate::tables::WizardTables;

/// Deterministic step definitions backed by [`WizardTables`]
#[derive(Clone, Debug)]
pub struct RuleBook {
    tables: Arc<WizardTables>,
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::new(Arc::new(WizardTables::default()))
    }
}

impl RuleBook {
    pub const fn new(tables: Arc<WizardTables>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &WizardTables {
        &self.tables
    }
}

impl StepOracle for RuleBook {
    fn prompt(&self, step: Step, state: &ConversationState) -> Prompt {
        match step {
            Step::Goal => goal::prompt(state),
            Step::Capital => capital::prompt(state),
            Step::Risk => risk::prompt(state),
            Step::Strategy => strategy::prompt(&self.tables, state),
            Step::Review => review::prompt(&self.tables, state),
        }
    }

    fn extract(&self, step: Step, input: &str, state: &ConversationState) -> ConfigPatch {
        match step {
            Step::Goal => goal::extract(input, state),
            Step::Capital => capital::extract(input, state),
            Step::Risk => risk::extract(&self.tables, input, state),
            Step::Strategy => strategy::extract(&self.tables, input, state),
            Step::Review => review::extract(input),
        }
    }

    fn validate(
        &self,
        step: Step,
        patch: &ConfigPatch,
        state: &ConversationState,
    ) -> Option<ValidationOutcome> {
        match step {
            Step::Goal => None,
            Step::Capital => capital::validate(&self.tables, patch, state),
            Step::Risk => risk::validate(&self.tables, state),
            Step::Strategy => strategy::validate(&self.tables, patch, state),
            Step::Review => review::validate(patch, state),
        }
    }

    fn wants_restart(&self, step: Step, input: &str) -> bool {
        step.is_terminal() && review::is_restart(input)
    }
}
