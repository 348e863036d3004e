// SPDX-License-Identifier: MIT

//! Step workers - the pluggable work performed by each step
//!
//! A compiled step owns an agent and an instruction; what it actually does
//! with them is delegated to a `StepWorker`:
//! - `PlaceholderWorker` - deterministic text, no external calls
//! - `ModelWorker` - asks a chat model using the agent's configuration
//! - `EchoWorker` - repeats the last message (single-agent chat)

use async_trait::async_trait;
use std::sync::Arc;

use super::state::ExecutionState;
use crate::adk::error::BoxError;
use crate::adk::model::{ChatMessage, GenerationConfig, Model};
use crate::agentops::models::Agent;

/// Everything a worker may read while performing one step
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub agent: &'a Agent,
    pub instruction: &'a str,
    pub state: &'a ExecutionState,
}

/// Core trait for step work
#[async_trait]
pub trait StepWorker: Send + Sync {
    /// Returns the worker name
    fn name(&self) -> &str;

    /// Produce the output text of one step
    async fn perform(&self, ctx: StepContext<'_>) -> Result<String, BoxError>;
}

/// Fabricates a deterministic output from the instruction and agent name
#[derive(Debug, Clone, Default)]
pub struct PlaceholderWorker;

#[async_trait]
impl StepWorker for PlaceholderWorker {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn perform(&self, ctx: StepContext<'_>) -> Result<String, BoxError> {
        Ok(format!(
            "Processed '{}' by {}",
            ctx.instruction, ctx.agent.name
        ))
    }
}

/// Repeats the content of the most recent message
#[derive(Debug, Clone, Default)]
pub struct EchoWorker;

#[async_trait]
impl StepWorker for EchoWorker {
    fn name(&self) -> &str {
        "echo"
    }

    async fn perform(&self, ctx: StepContext<'_>) -> Result<String, BoxError> {
        let last = ctx
            .state
            .last_message()
            .ok_or("No message to reply to")?;
        Ok(format!("Echo: {}", last.content))
    }
}

/// Calls a chat model with the agent's model id and system prompt
pub struct ModelWorker {
    model: Arc<dyn Model>,
    config: Option<GenerationConfig>,
}

impl ModelWorker {
    pub fn new(model: Arc<dyn Model>, config: Option<GenerationConfig>) -> Self {
        Self { model, config }
    }

    /// System prompt, prior step outputs as assistant turns, then the instruction
    fn build_messages(ctx: &StepContext<'_>) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(ctx.state.messages.len() + 2);
        if !ctx.agent.system_prompt.is_empty() {
            messages.push(ChatMessage::system(ctx.agent.system_prompt.clone()));
        }
        for msg in &ctx.state.messages {
            let content = match &msg.name {
                Some(name) if msg.role == "assistant" => format!("[{}] {}", name, msg.content),
                _ => msg.content.clone(),
            };
            messages.push(match msg.role.as_str() {
                "assistant" => ChatMessage::assistant(content),
                "system" => ChatMessage::system(content),
                _ => ChatMessage::user(content),
            });
        }
        messages.push(ChatMessage::user(ctx.instruction.to_string()));
        messages
    }
}

#[async_trait]
impl StepWorker for ModelWorker {
    fn name(&self) -> &str {
        "model"
    }

    async fn perform(&self, ctx: StepContext<'_>) -> Result<String, BoxError> {
        let messages = Self::build_messages(&ctx);
        log::info!(
            "Agent {} calling model {} with {} messages",
            ctx.agent.name,
            ctx.agent.model,
            messages.len()
        );
        let text = self
            .model
            .generate(&ctx.agent.model, &messages, self.config.as_ref())
            .await?;
        Ok(text)
    }
}
