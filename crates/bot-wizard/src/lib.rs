//! # bot-wizard
//!
//! Guided conversation that turns a handful of chat answers into a
//! risk-bounded paper trading bot configuration.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐
//! │ 1. Goal  │──▶│2. Capital│──▶│ 3. Risk  │──▶│4.Strategy│──▶│5. Review │
//! └──────────┘   └──────────┘   └──────────┘   └──────────┘   └──────────┘
//!   hints:          floor $10      table        catalog         deploy?
//!   experience,     beginner →     limits,      params,           │
//!   strategy        paper          beginner     name              ▼
//!                                  ≤ medium                 three variants
//! ```
//!
//! Each turn runs `extract → merge → validate` for the current step. A
//! blocking validation keeps the conversation where it is; a warning is shown
//! with the next question and may carry an override (e.g. high risk capped to
//! medium for beginners).
//!
//! ## Example
//!
//! ```rust,ignore
//! use bot_wizard::ConversationEngine;
//!
//! let engine = ConversationEngine::default();
//! let mut turn = engine.start();
//! for reply in ["Build wealth over time", "$500 - $2,000"] {
//!     turn = engine.advance(&turn.state, reply)?;
//!     println!("{}", turn.reply_text());
//! }
//! ```

pub mod deploy;
pub mod derivation;
pub mod engine;
pub mod error;
pub mod guide;
pub mod model;
pub mod steps;
pub mod store;
pub mod tables;

pub use deploy::deploy_bot;
pub use derivation::ConfigurationDeriver;
pub use engine::{ConversationEngine, Turn};
pub use error::{Result, WizardError};
pub use guide::{GuideReply, LlmGuide};
pub use model::{
    BotConfig, BotOptionVariant, ConfigPatch, ConversationState, DerivedHints, ExperienceLevel,
    RiskLevel, RiskLimits, Step, StrategyKind, StrategyParams, TradingMode, VariantId,
};
pub use steps::{Prompt, RuleBook, Severity, StepOracle, ValidationOutcome};
pub use store::{
    BotId, BotRecord, BotStore, ConversationId, ConversationRecord, ConversationStore,
    MemoryBotStore, MemoryConversationStore,
};
pub use tables::WizardTables;
