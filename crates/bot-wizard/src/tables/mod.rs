//! Wizard Tables
//!
//! Immutable configuration handed to the rule book and the derivation at
//! construction time. Defaults are the canonical tables; tests and deployments
//! can substitute their own, e.g. from a JSON file.

mod catalog;
mod risk;
mod variants;

pub use catalog::{StrategyCatalog, StrategyDefaults, StrategyDescriptor};
pub use risk::{RiskProfile, RiskProfileTable};
pub use variants::{VariantProfile, VariantProfileTable};

use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WizardError};

/// Capital and pair policy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalPolicy {
    /// Hard floor; anything below blocks the capital step
    pub min_capital: Decimal,
    /// Beginners above this amount are warned and kept on paper
    pub beginner_capital_ceiling: Decimal,
    pub default_trading_pair: String,
}

impl Default for CapitalPolicy {
    fn default() -> Self {
        Self {
            min_capital: dec!(10),
            beginner_capital_ceiling: dec!(1000),
            default_trading_pair: "BTC/USDT".into(),
        }
    }
}

/// Every table the wizard reads
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardTables {
    #[serde(default)]
    pub risk_profiles: RiskProfileTable,
    #[serde(default)]
    pub strategies: StrategyCatalog,
    #[serde(default)]
    pub variants: VariantProfileTable,
    #[serde(default)]
    pub policy: CapitalPolicy,
}

impl WizardTables {
    /// Parse and validate tables from JSON text; missing sections use defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let tables: Self = serde_json::from_str(json)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Load tables from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tables = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), "Loaded wizard tables");
        Ok(tables)
    }

    /// Sanity-check numeric ranges and catalog consistency
    pub fn validate(&self) -> Result<()> {
        self.risk_profiles.check().map_err(WizardError::Config)?;
        self.strategies.check().map_err(WizardError::Config)?;
        self.variants.check().map_err(WizardError::Config)?;

        if self.policy.min_capital <= Decimal::ZERO {
            return Err(WizardError::Config("minimum capital must be positive".into()));
        }
        if !self.policy.default_trading_pair.contains('/') {
            return Err(WizardError::Config(format!(
                "trading pair '{}' must look like BASE/QUOTE",
                self.policy.default_trading_pair
            )));
        }
        Ok(())
    }
}

/// Base asset of a `BASE/QUOTE` pair ("BTC/USDT" -> "BTC")
pub fn base_asset(pair: &str) -> &str {
    pair.split('/').next().unwrap_or(pair).trim()
}
