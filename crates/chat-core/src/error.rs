//! Error Types

use thiserror::Error;

/// Result type alias for chat and provider operations
pub type Result<T> = std::result::Result<T, ChatError>;

/// Chat/provider error types
#[derive(Error, Debug)]
pub enum ChatError {
    /// LLM provider returned an error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Context length exceeded
    #[error("Context length exceeded: {used} tokens (max: {max})")]
    ContextOverflow { used: u32, max: u32 },

    /// Response could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChatError {
    /// Check if error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_) | Self::RateLimited(_)
        )
    }

    /// Convert to a message that can be shown inside the chat
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(msg) => format!("The assistant ran into a problem: {msg}"),
            Self::ProviderUnavailable(_) => {
                "The assistant is currently unavailable. Please try again.".into()
            }
            Self::ContextOverflow { .. } => {
                "This conversation has grown too long. Please start over.".into()
            }
            Self::RateLimited(_) => "Too many messages at once. Please wait a moment.".into(),
            _ => "Something went wrong while preparing a reply.".into(),
        }
    }
}
