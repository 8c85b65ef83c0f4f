//! # chat-core
//!
//! Chat primitives shared by the wizard engine and its HTTP surface, plus a
//! provider-agnostic LLM abstraction for the assistant-driven path.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      chat-core                            │
//! │  ┌─────────────┐  ┌──────────────┐  ┌─────────────────┐  │
//! │  │   Message   │  │ Conversation │  │   LlmProvider   │  │
//! │  │ QuickReply  │──│  transcript  │──│   (Strategy)    │  │
//! │  └─────────────┘  └──────────────┘  └─────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait lets the wizard swap between hosted and local
//! models without the conversation code knowing which one answers.

pub mod blocks;
pub mod error;
pub mod message;
pub mod provider;

pub use blocks::{fenced_block, parse_fenced_json};
pub use error::{ChatError, Result};
pub use message::{Conversation, Message, QuickReply, Role};
pub use provider::{Completion, FinishReason, GenerationOptions, LlmProvider, TokenUsage};
