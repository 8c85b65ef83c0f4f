//! Domain Models
//!
//! Conversation state, partial configuration patches and the bot variants
//! offered at the end of the guided flow.
//! Uses `rust_decimal` for all monetary values - never use f64 for money!

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WizardError};

/// How much trading experience the user described
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
    #[default]
    Unknown,
}

/// Supported strategy templates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    Dca,
    Grid,
    Momentum,
    MeanReversion,
}

impl StrategyKind {
    pub const ALL: [Self; 4] = [Self::Dca, Self::Grid, Self::Momentum, Self::MeanReversion];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dca => "dca",
            Self::Grid => "grid",
            Self::Momentum => "momentum",
            Self::MeanReversion => "mean-reversion",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse risk classification; ordered from safest to riskiest
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Highest level a user with this experience may run
    pub const fn cap_for(experience: ExperienceLevel) -> Self {
        match experience {
            ExperienceLevel::Beginner => Self::Medium,
            _ => Self::High,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label for how the bot trades; live execution itself is not provided
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradingMode {
    #[default]
    Paper,
    Live,
}

/// The five steps of the guided flow
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    Goal = 1,
    Capital = 2,
    Risk = 3,
    Strategy = 4,
    Review = 5,
}

impl Step {
    pub const ALL: [Self; 5] = [
        Self::Goal,
        Self::Capital,
        Self::Risk,
        Self::Strategy,
        Self::Review,
    ];

    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Following step; `Review` is terminal and maps to itself
    pub const fn next(self) -> Self {
        match self {
            Self::Goal => Self::Capital,
            Self::Capital => Self::Risk,
            Self::Risk => Self::Strategy,
            Self::Strategy | Self::Review => Self::Review,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Review)
    }
}

impl TryFrom<u8> for Step {
    type Error = WizardError;

    fn try_from(n: u8) -> Result<Self> {
        match n {
            1 => Ok(Self::Goal),
            2 => Ok(Self::Capital),
            3 => Ok(Self::Risk),
            4 => Ok(Self::Strategy),
            5 => Ok(Self::Review),
            other => Err(WizardError::InvalidStep(other)),
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Strategy-specific knobs, populated at the strategy confirmation step
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum StrategyParams {
    Dca {
        /// Amount bought each interval
        buy_amount: Decimal,
        interval_hours: u32,
        /// `None` = unlimited buys
        max_buys: Option<u32>,
    },
    Grid {
        grid_levels: u32,
        investment_per_grid: Decimal,
        /// Price bounds are resolved at execution time
        lower_price: Option<Decimal>,
        upper_price: Option<Decimal>,
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
        /// Entry distance from the moving average, in standard deviations
        deviation_threshold: Decimal,
        exit_deviation: Decimal,
    },
}

impl StrategyParams {
    pub const fn kind(&self) -> StrategyKind {
        match self {
            Self::Dca { .. } => StrategyKind::Dca,
            Self::Grid { .. } => StrategyKind::Grid,
            Self::Momentum { .. } => StrategyKind::Momentum,
            Self::MeanReversion { .. } => StrategyKind::MeanReversion,
        }
    }

    /// One-line human summary used in prompts
    pub fn summary(&self) -> String {
        match self {
            Self::Dca {
                buy_amount,
                interval_hours,
                max_buys,
            } => {
                let limit = max_buys
                    .map_or_else(|| "no limit on buys".to_string(), |n| format!("up to {n} buys"));
                format!("buys ${buy_amount} every {interval_hours}h, {limit}")
            }
            Self::Grid {
                grid_levels,
                investment_per_grid,
                ..
            } => format!("{grid_levels} grid levels with ${investment_per_grid} each"),
            Self::Momentum {
                rsi_period,
                macd_fast,
                macd_slow,
                macd_signal,
                ..
            } => format!(
                "RSI({rsi_period}) with MACD({macd_fast}/{macd_slow}/{macd_signal}) confirmation"
            ),
            Self::MeanReversion {
                ma_period,
                deviation_threshold,
                ..
            } => format!(
                "enters {deviation_threshold} std devs away from the {ma_period}-period average"
            ),
        }
    }
}

/// The four numeric risk controls, always derived together from a risk level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskLimits {
    pub stop_loss_percentage: Decimal,
    pub take_profit_percentage: Decimal,
    /// Absolute currency amount
    pub max_daily_loss: Decimal,
    /// Percentage of capital
    pub max_position_size: Decimal,
}

/// Values inferred along the way that are not part of the committed bot
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedHints {
    pub experience_level: ExperienceLevel,
    pub suggested_strategy: Option<StrategyKind>,
}

/// Committed bot configuration accumulated over the conversation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    pub trading_goal: Option<String>,
    pub capital_allocated: Option<Decimal>,
    pub trading_mode: TradingMode,
    pub risk_level: Option<RiskLevel>,
    pub stop_loss_percentage: Option<Decimal>,
    pub take_profit_percentage: Option<Decimal>,
    pub max_daily_loss: Option<Decimal>,
    pub max_position_size: Option<Decimal>,
    pub trading_pair: Option<String>,
    pub strategy_type: Option<StrategyKind>,
    pub strategy_params: Option<StrategyParams>,
    pub name: Option<String>,
}

impl BotConfig {
    /// The risk limits, if all four have been derived
    pub fn risk_limits(&self) -> Option<RiskLimits> {
        match (
            self.stop_loss_percentage,
            self.take_profit_percentage,
            self.max_daily_loss,
            self.max_position_size,
        ) {
            (Some(stop_loss), Some(take_profit), Some(daily), Some(position)) => Some(RiskLimits {
                stop_loss_percentage: stop_loss,
                take_profit_percentage: take_profit,
                max_daily_loss: daily,
                max_position_size: position,
            }),
            _ => None,
        }
    }

    fn set_risk_limits(&mut self, limits: RiskLimits) {
        self.stop_loss_percentage = Some(limits.stop_loss_percentage);
        self.take_profit_percentage = Some(limits.take_profit_percentage);
        self.max_daily_loss = Some(limits.max_daily_loss);
        self.max_position_size = Some(limits.max_position_size);
    }
}

/// Per-conversation accumulator, owned by exactly one conversation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    /// Raw step number; validated through [`ConversationState::step`]
    pub current_step: u8,
    pub hints: DerivedHints,
    pub config: BotConfig,
    pub ready_to_deploy: bool,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            current_step: Step::Goal.number(),
            hints: DerivedHints::default(),
            config: BotConfig::default(),
            ready_to_deploy: false,
        }
    }

    /// Current step, rejecting out-of-range numbers
    pub fn step(&self) -> Result<Step> {
        Step::try_from(self.current_step)
    }

    /// Effective strategy: confirmed type, else the hint, else DCA
    pub fn effective_strategy(&self) -> StrategyKind {
        self.config
            .strategy_type
            .or(self.hints.suggested_strategy)
            .unwrap_or(StrategyKind::Dca)
    }

    pub fn is_beginner(&self) -> bool {
        self.hints.experience_level == ExperienceLevel::Beginner
    }

    /// Merge a patch; set fields win, unset fields are inherited.
    ///
    /// The trading goal is written once and never replaced.
    pub fn apply(&mut self, patch: &ConfigPatch) {
        if let Some(level) = patch.experience_level {
            self.hints.experience_level = level;
        }
        if patch.suggested_strategy.is_some() {
            self.hints.suggested_strategy = patch.suggested_strategy;
        }
        if self.config.trading_goal.is_none() {
            self.config.trading_goal.clone_from(&patch.trading_goal);
        }
        if patch.capital_allocated.is_some() {
            self.config.capital_allocated = patch.capital_allocated;
        }
        if let Some(mode) = patch.trading_mode {
            self.config.trading_mode = mode;
        }
        if patch.risk_level.is_some() {
            self.config.risk_level = patch.risk_level;
        }
        if let Some(limits) = patch.risk_limits {
            self.config.set_risk_limits(limits);
        }
        if patch.trading_pair.is_some() {
            self.config.trading_pair.clone_from(&patch.trading_pair);
        }
        if patch.strategy_type.is_some() {
            self.config.strategy_type = patch.strategy_type;
        }
        if patch.strategy_params.is_some() {
            self.config.strategy_params.clone_from(&patch.strategy_params);
        }
        if patch.name.is_some() {
            self.config.name.clone_from(&patch.name);
        }
        if let Some(ready) = patch.ready_to_deploy {
            self.ready_to_deploy = ready;
        }
    }
}

/// What a reply meant, beyond the fields it set
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyIntent {
    Affirmed,
    Declined,
    AlternativeRequested,
    ChangesRequested,
}

/// Partial configuration produced by one extraction (or a validation override)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trading_goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_strategy: Option<StrategyKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capital_allocated: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trading_mode: Option<TradingMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(flatten)]
    pub risk_limits: Option<RiskLimits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trading_pair: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_type: Option<StrategyKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_params: Option<StrategyParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_to_deploy: Option<bool>,
    #[serde(skip)]
    pub intent: Option<ReplyIntent>,
}

impl ConfigPatch {
    /// True when the patch sets no configuration field
    pub fn is_empty(&self) -> bool {
        let fields_only = Self {
            intent: None,
            ..self.clone()
        };
        fields_only == Self::default()
    }

    /// Overlay `other` on top of `self`; fields set in `other` win
    #[must_use]
    pub fn overlay(mut self, other: &Self) -> Self {
        if other.trading_goal.is_some() {
            self.trading_goal.clone_from(&other.trading_goal);
        }
        self.experience_level = other.experience_level.or(self.experience_level);
        self.suggested_strategy = other.suggested_strategy.or(self.suggested_strategy);
        self.capital_allocated = other.capital_allocated.or(self.capital_allocated);
        self.trading_mode = other.trading_mode.or(self.trading_mode);
        self.risk_level = other.risk_level.or(self.risk_level);
        self.risk_limits = other.risk_limits.or(self.risk_limits);
        if other.trading_pair.is_some() {
            self.trading_pair.clone_from(&other.trading_pair);
        }
        self.strategy_type = other.strategy_type.or(self.strategy_type);
        if other.strategy_params.is_some() {
            self.strategy_params.clone_from(&other.strategy_params);
        }
        if other.name.is_some() {
            self.name.clone_from(&other.name);
        }
        self.ready_to_deploy = other.ready_to_deploy.or(self.ready_to_deploy);
        self.intent = other.intent.or(self.intent);
        self
    }
}

/// Identifier of one of the three offered bots
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantId {
    Conservative,
    Balanced,
    Aggressive,
}

impl VariantId {
    pub const fn for_risk(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => Self::Conservative,
            RiskLevel::Medium => Self::Balanced,
            RiskLevel::High => Self::Aggressive,
        }
    }

    pub const fn risk_level(self) -> RiskLevel {
        match self {
            Self::Conservative => RiskLevel::Low,
            Self::Balanced => RiskLevel::Medium,
            Self::Aggressive => RiskLevel::High,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Conservative => "Conservative",
            Self::Balanced => "Balanced",
            Self::Aggressive => "Aggressive",
        }
    }
}

impl std::str::FromStr for VariantId {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(Self::Conservative),
            "balanced" => Ok(Self::Balanced),
            "aggressive" => Ok(Self::Aggressive),
            _ => Err(WizardError::UnknownOption(s.to_string())),
        }
    }
}

/// Illustrative yearly return band, in percent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnRange {
    pub min: Decimal,
    pub max: Decimal,
}

/// Configuration carried by an offered bot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantConfig {
    pub trading_pair: String,
    pub capital_allocated: Decimal,
    #[serde(flatten)]
    pub limits: RiskLimits,
    pub strategy_params: StrategyParams,
}

/// One of the three bots offered at the end of the flow; never mutated
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotOptionVariant {
    pub id: VariantId,
    pub strategy_type: StrategyKind,
    pub risk_level: RiskLevel,
    pub config: VariantConfig,
    pub expected_return_range: ReturnRange,
    pub max_drawdown: Decimal,
    pub win_rate: Decimal,
    pub confidence: Decimal,
    pub reasoning: String,
}
