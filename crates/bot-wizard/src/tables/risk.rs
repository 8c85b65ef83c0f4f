//! Risk Profile Table
//!
//! Maps a risk level to the numeric controls every bot carries.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::model::{RiskLevel, RiskLimits};

/// Numeric parameters for one risk level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfile {
    pub stop_loss_percentage: Decimal,
    pub take_profit_percentage: Decimal,
    /// Fraction of capital that may be lost in one day (0.02 = 2%)
    pub max_daily_loss_fraction: Decimal,
    /// Percentage of capital a single position may use
    pub max_position_size: Decimal,
}

impl RiskProfile {
    /// Concrete limits for an allocation; the daily loss becomes a currency amount
    pub fn limits_for(&self, capital: Decimal) -> RiskLimits {
        RiskLimits {
            stop_loss_percentage: self.stop_loss_percentage,
            take_profit_percentage: self.take_profit_percentage,
            max_daily_loss: (capital * self.max_daily_loss_fraction).round_dp(2),
            max_position_size: self.max_position_size,
        }
    }
}

/// One profile per risk level
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskProfileTable {
    pub low: RiskProfile,
    pub medium: RiskProfile,
    pub high: RiskProfile,
}

impl Default for RiskProfileTable {
    fn default() -> Self {
        Self {
            low: RiskProfile {
                stop_loss_percentage: dec!(3),
                take_profit_percentage: dec!(5),
                max_daily_loss_fraction: dec!(0.02),
                max_position_size: dec!(25),
            },
            medium: RiskProfile {
                stop_loss_percentage: dec!(5),
                take_profit_percentage: dec!(10),
                max_daily_loss_fraction: dec!(0.05),
                max_position_size: dec!(50),
            },
            high: RiskProfile {
                stop_loss_percentage: dec!(8),
                take_profit_percentage: dec!(15),
                max_daily_loss_fraction: dec!(0.10),
                max_position_size: dec!(75),
            },
        }
    }
}

impl RiskProfileTable {
    pub const fn get(&self, level: RiskLevel) -> &RiskProfile {
        match level {
            RiskLevel::Low => &self.low,
            RiskLevel::Medium => &self.medium,
            RiskLevel::High => &self.high,
        }
    }

    /// Shorthand for `get(level).limits_for(capital)`
    pub fn limits(&self, level: RiskLevel, capital: Decimal) -> RiskLimits {
        self.get(level).limits_for(capital)
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        for level in RiskLevel::ALL {
            let profile = self.get(level);
            if profile.stop_loss_percentage <= Decimal::ZERO
                || profile.take_profit_percentage <= Decimal::ZERO
            {
                return Err(format!("{level} risk: stop-loss and take-profit must be positive"));
            }
            if profile.max_daily_loss_fraction <= Decimal::ZERO
                || profile.max_daily_loss_fraction > Decimal::ONE
            {
                return Err(format!("{level} risk: daily loss fraction must be in (0, 1]"));
            }
            if profile.max_position_size <= Decimal::ZERO || profile.max_position_size > dec!(100) {
                return Err(format!("{level} risk: position size must be in (0, 100]"));
            }
        }
        if self.low.stop_loss_percentage > self.high.stop_loss_percentage {
            return Err("low risk must not allow a wider stop-loss than high risk".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_for_thousand() {
        let table = RiskProfileTable::default();
        let low = table.limits(RiskLevel::Low, dec!(1000));
        assert_eq!(low.stop_loss_percentage, dec!(3));
        assert_eq!(low.take_profit_percentage, dec!(5));
        assert_eq!(low.max_daily_loss, dec!(20));
        assert_eq!(low.max_position_size, dec!(25));

        let high = table.limits(RiskLevel::High, dec!(1000));
        assert_eq!(high.max_daily_loss, dec!(100));
        assert_eq!(high.max_position_size, dec!(75));
    }

    #[test]
    fn test_daily_loss_rounds_to_cents() {
        let table = RiskProfileTable::default();
        let medium = table.limits(RiskLevel::Medium, dec!(333.33));
        assert_eq!(medium.max_daily_loss, dec!(16.67));
    }

    #[test]
    fn test_check_rejects_bad_fraction() {
        let mut table = RiskProfileTable::default();
        assert!(table.check().is_ok());
        table.medium.max_daily_loss_fraction = dec!(1.5);
        assert!(table.check().is_err());
    }
}
