//! Configuration Derivation
//!
//! Turns a reviewed conversation into the three bots offered to the user.
//! All three share strategy, capital, pair and parameters; only the risk tier
//! (and everything computed from it) differs.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::error::{Result, WizardError};
use crate::model::{
    BotOptionVariant, ConversationState, RiskLevel, Step, StrategyKind, StrategyParams,
    VariantConfig, VariantId,
};
use crate::tables::WizardTables;

/// What every variant holds fixed
struct Basis {
    strategy_type: StrategyKind,
    capital: Decimal,
    trading_pair: String,
    params: StrategyParams,
}

#[derive(Clone, Debug)]
pub struct ConfigurationDeriver {
    tables: Arc<WizardTables>,
}

impl ConfigurationDeriver {
    pub const fn new(tables: Arc<WizardTables>) -> Self {
        Self { tables }
    }

    fn basis(&self, state: &ConversationState) -> Result<Basis> {
        if state.step()? != Step::Review {
            return Err(WizardError::IncompleteConfiguration("review step"));
        }
        let capital = state
            .config
            .capital_allocated
            .ok_or(WizardError::IncompleteConfiguration("capitalAllocated"))?;
        let strategy_type = state
            .config
            .strategy_type
            .ok_or(WizardError::IncompleteConfiguration("strategyType"))?;
        let params = state
            .config
            .strategy_params
            .clone()
            .unwrap_or_else(|| self.tables.strategies.params_for(strategy_type, capital));
        let trading_pair = state
            .config
            .trading_pair
            .clone()
            .unwrap_or_else(|| self.tables.policy.default_trading_pair.clone());

        Ok(Basis {
            strategy_type,
            capital,
            trading_pair,
            params,
        })
    }

    fn build(&self, basis: &Basis, level: RiskLevel) -> BotOptionVariant {
        let profile = self.tables.variants.get(level);
        BotOptionVariant {
            id: VariantId::for_risk(level),
            strategy_type: basis.strategy_type,
            risk_level: level,
            config: VariantConfig {
                trading_pair: basis.trading_pair.clone(),
                capital_allocated: basis.capital,
                limits: self.tables.risk_profiles.limits(level, basis.capital),
                strategy_params: basis.params.clone(),
            },
            expected_return_range: profile.expected_return_range,
            max_drawdown: profile.max_drawdown,
            win_rate: profile.win_rate,
            confidence: profile.confidence,
            reasoning: profile.reasoning.clone(),
        }
    }

    /// Exactly three variants, low to high, whatever risk level was chosen
    pub fn derive(&self, state: &ConversationState) -> Result<Vec<BotOptionVariant>> {
        let basis = self.basis(state)?;
        let variants: Vec<_> = RiskLevel::ALL
            .into_iter()
            .map(|level| self.build(&basis, level))
            .collect();
        tracing::debug!(
            strategy = %basis.strategy_type,
            capital = %basis.capital,
            "Derived bot variants"
        );
        Ok(variants)
    }

    /// The single variant with the given id
    pub fn variant(&self, state: &ConversationState, id: VariantId) -> Result<BotOptionVariant> {
        let basis = self.basis(state)?;
        Ok(self.build(&basis, id.risk_level()))
    }

    /// Option the UI should preselect
    pub fn highlighted(state: &ConversationState) -> VariantId {
        state
            .config
            .risk_level
            .map_or(VariantId::Balanced, VariantId::for_risk)
    }

    /// Canonical variant for the tier of an externally proposed option.
    ///
    /// Strategy, pair, params and every number come from the conversation and
    /// the tables; only the proposal's reasoning text is kept.
    pub fn normalize(
        &self,
        state: &ConversationState,
        option: BotOptionVariant,
    ) -> Result<BotOptionVariant> {
        let mut canonical = self.variant(state, option.id)?;
        if option.strategy_type != canonical.strategy_type
            || option.config.trading_pair != canonical.config.trading_pair
            || option.config.strategy_params != canonical.config.strategy_params
        {
            tracing::warn!(
                option = option.id.label(),
                "Proposed option diverged from the conversation; using canonical setup"
            );
        }
        if !option.reasoning.trim().is_empty() {
            canonical.reasoning = option.reasoning;
        }
        Ok(canonical)
    }
}
