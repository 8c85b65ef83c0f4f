//! LLM Guide
//!
//! Assistant-driven alternative to the rule book. The model writes the reply
//! text; at the review step it may also propose the three bots in a fenced
//! `json` block. Any proposed option is re-derived from the canonical tables,
//! so the model never decides a number.

use std::sync::Arc;

use chat_core::{
    parse_fenced_json, ChatError, Conversation, GenerationOptions, LlmProvider, Message, Role,
};
use serde::Deserialize;

use crate::derivation::ConfigurationDeriver;
use crate::error::Result;
use crate::model::{BotOptionVariant, ConversationState, RiskLevel, Step, VariantId};
use crate::tables::WizardTables;

const SYSTEM_PROMPT: &str = r#"You are a friendly assistant that helps people set up a paper trading bot for crypto.
Walk the user through five steps, one question at a time:
1. their goal, 2. how much capital to allocate, 3. their risk tolerance,
4. confirming the recommended strategy, 5. a final review before deployment.

Keep answers short and plain. Never promise returns. Bots trade with simulated funds."#;

const OPTIONS_INSTRUCTIONS: &str = r#"The user is at the final review. After your reply, propose exactly three bots
(conservative, balanced, aggressive) in a single fenced block:
```json
{"options": [ ... three objects shaped like the example ... ]}
```
Example option:"#;

/// The model may answer with `{"options": [...]}` or a bare array
#[derive(Deserialize)]
#[serde(untagged)]
enum OptionsBlock {
    Wrapped { options: Vec<BotOptionVariant> },
    Bare(Vec<BotOptionVariant>),
}

impl OptionsBlock {
    fn into_vec(self) -> Vec<BotOptionVariant> {
        match self {
            Self::Wrapped { options } | Self::Bare(options) => options,
        }
    }
}

/// One assistant reply from the guide
#[derive(Clone, Debug)]
pub struct GuideReply {
    pub content: String,
    pub next_step: Step,
    /// Normalised options, only at the review step
    pub options: Option<Vec<BotOptionVariant>>,
}

pub struct LlmGuide {
    provider: Arc<dyn LlmProvider>,
    deriver: ConfigurationDeriver,
    generation: GenerationOptions,
}

impl LlmGuide {
    pub fn new(provider: Arc<dyn LlmProvider>, tables: Arc<WizardTables>) -> Self {
        Self {
            provider,
            deriver: ConfigurationDeriver::new(tables),
            generation: GenerationOptions::default(),
        }
    }

    #[must_use]
    pub fn with_generation(mut self, generation: GenerationOptions) -> Self {
        self.generation = generation;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// System prompt embedding the current step and accumulated state
    pub fn system_prompt(&self, state: &ConversationState) -> Result<String> {
        let step = state.step()?;
        let mut prompt = format!(
            "{SYSTEM_PROMPT}\n\nCurrent step: {step} of 5\nWhat we know so far:\n```json\n{}\n```",
            serde_json::to_string_pretty(state)?
        );

        if step.is_terminal() {
            prompt.push_str("\n\n");
            prompt.push_str(OPTIONS_INSTRUCTIONS);
            if let Ok(example) = self.deriver.variant(state, VariantId::Balanced) {
                prompt.push_str("\n```json\n");
                prompt.push_str(&serde_json::to_string_pretty(&example)?);
                prompt.push_str("\n```");
            }
        }
        Ok(prompt)
    }

    /// Ask the model for the next reply.
    ///
    /// `transcript` holds the user and assistant turns so far; any system
    /// messages in it are replaced by a fresh system prompt.
    pub async fn respond(
        &self,
        state: &ConversationState,
        transcript: &Conversation,
    ) -> Result<GuideReply> {
        let step = state.step()?;

        let mut conversation = Conversation::new();
        conversation.push(Message::system(self.system_prompt(state)?));
        for message in transcript.messages().iter().filter(|m| m.role != Role::System) {
            conversation.push(message.clone());
        }
        conversation.truncate_to_fit();
        let (used, max) = (conversation.estimate_tokens(), conversation.max_context_tokens());
        if used > max {
            return Err(ChatError::ContextOverflow { used, max }.into());
        }

        let completion = self
            .provider
            .complete(conversation.messages(), &self.generation)
            .await?;
        if completion.truncated() {
            tracing::warn!(model = %completion.model, "Assistant reply was cut short");
        }

        let options = if step.is_terminal() {
            self.parse_options(&completion.content, state)
        } else {
            None
        };

        Ok(GuideReply {
            content: completion.content,
            next_step: step.next(),
            options,
        })
    }

    fn parse_options(
        &self,
        content: &str,
        state: &ConversationState,
    ) -> Option<Vec<BotOptionVariant>> {
        let Some(block) = parse_fenced_json::<OptionsBlock>(content) else {
            tracing::warn!("Assistant reply had no usable options block");
            return None;
        };
        let mut options = block.into_vec();
        options.sort_by_key(|o| o.id.risk_level());
        options.dedup_by_key(|o| o.id);

        let tiers: Vec<RiskLevel> = options.iter().map(|o| o.id.risk_level()).collect();
        if tiers != RiskLevel::ALL {
            tracing::warn!(
                count = options.len(),
                "Assistant proposed an incomplete set of options"
            );
            return None;
        }

        options
            .into_iter()
            .map(|option| self.deriver.normalize(state, option))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| tracing::warn!(error = %e, "Could not normalise proposed options"))
            .ok()
    }
}
