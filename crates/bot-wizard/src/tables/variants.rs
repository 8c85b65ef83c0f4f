//! Illustrative figures shown next to each offered bot.
//!
//! These are presentation constants per risk tier, not backtest results.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::model::{ReturnRange, RiskLevel};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantProfile {
    pub expected_return_range: ReturnRange,
    /// Percent
    pub max_drawdown: Decimal,
    /// Percent of winning trades
    pub win_rate: Decimal,
    /// Percent
    pub confidence: Decimal,
    pub reasoning: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantProfileTable {
    pub low: VariantProfile,
    pub medium: VariantProfile,
    pub high: VariantProfile,
}

impl Default for VariantProfileTable {
    fn default() -> Self {
        Self {
            low: VariantProfile {
                expected_return_range: ReturnRange {
                    min: dec!(5),
                    max: dec!(15),
                },
                max_drawdown: dec!(10),
                win_rate: dec!(65),
                confidence: dec!(85),
                reasoning: "Tight stops and small positions keep drawdowns shallow. \
                            A good fit if protecting your capital matters more than upside."
                    .into(),
            },
            medium: VariantProfile {
                expected_return_range: ReturnRange {
                    min: dec!(10),
                    max: dec!(30),
                },
                max_drawdown: dec!(20),
                win_rate: dec!(58),
                confidence: dec!(75),
                reasoning: "Gives the strategy room to work while a daily loss cap keeps \
                            bad days contained. The middle ground for most users."
                    .into(),
            },
            high: VariantProfile {
                expected_return_range: ReturnRange {
                    min: dec!(20),
                    max: dec!(60),
                },
                max_drawdown: dec!(35),
                win_rate: dec!(50),
                confidence: dec!(60),
                reasoning: "Wide stops and large positions chase bigger moves. \
                            Expect deeper swings in exchange for more upside."
                    .into(),
            },
        }
    }
}

impl VariantProfileTable {
    pub const fn get(&self, level: RiskLevel) -> &VariantProfile {
        match level {
            RiskLevel::Low => &self.low,
            RiskLevel::Medium => &self.medium,
            RiskLevel::High => &self.high,
        }
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        for level in RiskLevel::ALL {
            let profile = self.get(level);
            if profile.expected_return_range.min > profile.expected_return_range.max {
                return Err(format!("{level} variant: return range is inverted"));
            }
            for (name, value) in [
                ("maxDrawdown", profile.max_drawdown),
                ("winRate", profile.win_rate),
                ("confidence", profile.confidence),
            ] {
                if value < Decimal::ZERO || value > dec!(100) {
                    return Err(format!("{level} variant: {name} must be a percentage"));
                }
            }
        }
        Ok(())
    }
}
