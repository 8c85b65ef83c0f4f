//! Strategy Catalog
//!
//! Static descriptors for every strategy the wizard can configure.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::model::{StrategyKind, StrategyParams};

/// Default knobs for a strategy; amount-like values are fractions of capital
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum StrategyDefaults {
    Dca {
        /// Share of capital spent per buy (0.05 = 5%)
        buy_fraction: Decimal,
        interval_hours: u32,
    },
    Grid {
        grid_levels: u32,
    },
    Momentum {
        rsi_period: u32,
        rsi_overbought: Decimal,
        rsi_oversold: Decimal,
        macd_fast: u32,
        macd_slow: u32,
        macd_signal: u32,
    },
    MeanReversion {
        ma_period: u32,
        deviation_threshold: Decimal,
        exit_deviation: Decimal,
    },
}

impl StrategyDefaults {
    pub const fn kind(&self) -> StrategyKind {
        match self {
            Self::Dca { .. } => StrategyKind::Dca,
            Self::Grid { .. } => StrategyKind::Grid,
            Self::Momentum { .. } => StrategyKind::Momentum,
            Self::MeanReversion { .. } => StrategyKind::MeanReversion,
        }
    }

    /// Concrete parameters for an allocation
    pub fn scaled(&self, capital: Decimal) -> StrategyParams {
        match *self {
            Self::Dca {
                buy_fraction,
                interval_hours,
            } => StrategyParams::Dca {
                buy_amount: (capital * buy_fraction).round_dp(2),
                interval_hours,
                max_buys: None,
            },
            Self::Grid { grid_levels } => StrategyParams::Grid {
                grid_levels,
                investment_per_grid: (capital / Decimal::from(grid_levels.max(1))).round_dp(2),
                lower_price: None,
                upper_price: None,
            },
            Self::Momentum {
                rsi_period,
                rsi_overbought,
                rsi_oversold,
                macd_fast,
                macd_slow,
                macd_signal,
            } => StrategyParams::Momentum {
                rsi_period,
                rsi_overbought,
                rsi_oversold,
                macd_fast,
                macd_slow,
                macd_signal,
            },
            Self::MeanReversion {
                ma_period,
                deviation_threshold,
                exit_deviation,
            } => StrategyParams::MeanReversion {
                ma_period,
                deviation_threshold,
                exit_deviation,
            },
        }
    }
}

/// Everything the wizard knows about one strategy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyDescriptor {
    pub display_name: String,
    pub description: String,
    /// Recommended minimum allocation (policy, not a hard block)
    pub min_capital: Decimal,
    pub defaults: StrategyDefaults,
}

impl StrategyDescriptor {
    pub const fn kind(&self) -> StrategyKind {
        self.defaults.kind()
    }
}

/// One descriptor per strategy kind
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StrategyCatalog {
    pub dca: StrategyDescriptor,
    pub grid: StrategyDescriptor,
    pub momentum: StrategyDescriptor,
    pub mean_reversion: StrategyDescriptor,
}

impl Default for StrategyCatalog {
    fn default() -> Self {
        Self {
            dca: StrategyDescriptor {
                display_name: "Dollar-Cost Averaging".into(),
                description: "buys a fixed amount at regular intervals regardless of price, \
                              smoothing out your entry over time"
                    .into(),
                min_capital: dec!(100),
                defaults: StrategyDefaults::Dca {
                    buy_fraction: dec!(0.05),
                    interval_hours: 24,
                },
            },
            grid: StrategyDescriptor {
                display_name: "Grid Trading".into(),
                description: "places buy and sell orders at evenly spaced price levels to \
                              profit from prices bouncing within a range"
                    .into(),
                min_capital: dec!(500),
                defaults: StrategyDefaults::Grid { grid_levels: 10 },
            },
            momentum: StrategyDescriptor {
                display_name: "Momentum".into(),
                description: "enters when RSI and MACD confirm directional strength and exits \
                              as that strength fades"
                    .into(),
                min_capital: dec!(500),
                defaults: StrategyDefaults::Momentum {
                    rsi_period: 14,
                    rsi_overbought: dec!(70),
                    rsi_oversold: dec!(30),
                    macd_fast: 12,
                    macd_slow: 26,
                    macd_signal: 9,
                },
            },
            mean_reversion: StrategyDescriptor {
                display_name: "Mean Reversion".into(),
                description: "trades against short-term moves away from the moving average, \
                              expecting price to snap back"
                    .into(),
                min_capital: dec!(300),
                defaults: StrategyDefaults::MeanReversion {
                    ma_period: 20,
                    deviation_threshold: dec!(2),
                    exit_deviation: dec!(0.5),
                },
            },
        }
    }
}

impl StrategyCatalog {
    pub const fn get(&self, kind: StrategyKind) -> &StrategyDescriptor {
        match kind {
            StrategyKind::Dca => &self.dca,
            StrategyKind::Grid => &self.grid,
            StrategyKind::Momentum => &self.momentum,
            StrategyKind::MeanReversion => &self.mean_reversion,
        }
    }

    /// Default parameters for `kind` scaled to `capital`
    pub fn params_for(&self, kind: StrategyKind, capital: Decimal) -> StrategyParams {
        self.get(kind).defaults.scaled(capital)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StrategyDescriptor> {
        StrategyKind::ALL.into_iter().map(|kind| self.get(kind))
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        for kind in StrategyKind::ALL {
            let descriptor = self.get(kind);
            if descriptor.kind() != kind {
                return Err(format!(
                    "catalog entry '{kind}' carries {} defaults",
                    descriptor.kind()
                ));
            }
            if descriptor.min_capital <= Decimal::ZERO {
                return Err(format!("catalog entry '{kind}': minimum capital must be positive"));
            }
        }
        if let StrategyDefaults::Dca { buy_fraction, .. } = self.dca.defaults {
            if buy_fraction <= Decimal::ZERO || buy_fraction > Decimal::ONE {
                return Err("dca buy fraction must be in (0, 1]".into());
            }
        }
        if let StrategyDefaults::Grid { grid_levels } = self.grid.defaults {
            if grid_levels == 0 {
                return Err("grid needs at least one level".into());
            }
        }
        Ok(())
    }
}
