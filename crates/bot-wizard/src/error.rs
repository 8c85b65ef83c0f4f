//! Error Types for the Bot Wizard

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WizardError>;

#[derive(Error, Debug)]
pub enum WizardError {
    /// Caller passed a step number outside 1..=5
    #[error("Invalid conversation step: {0} (expected 1-5)")]
    InvalidStep(u8),

    #[error("Configuration incomplete: {0} is not set")]
    IncompleteConfiguration(&'static str),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("Conversation {0} is not ready to deploy")]
    NotReadyToDeploy(String),

    #[error("Conversation {0} already created a bot")]
    AlreadyCompleted(String),

    #[error("Unknown bot option: {0}")]
    UnknownOption(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Assistant error: {0}")]
    Llm(#[from] chat_core::ChatError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WizardError {
    /// Programmer/configuration errors that must reject the request outright
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidStep(_) | Self::IncompleteConfiguration(_) | Self::Config(_)
        )
    }

    /// Message safe to show inside the chat
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidStep(_) => "That conversation step doesn't exist.".into(),
            Self::ConversationNotFound(_) => {
                "I couldn't find that conversation. Let's start a new one.".into()
            }
            Self::NotReadyToDeploy(_) => {
                "Please review and confirm your bot before creating it.".into()
            }
            Self::AlreadyCompleted(_) => "A bot was already created from this conversation.".into(),
            Self::UnknownOption(option) => format!("'{option}' is not one of the offered bots."),
            Self::Llm(e) => e.user_message(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}
