// SPDX-License-Identifier: MIT

//! Model module - defines the LLM model trait and implementations
//!
//! Model implementations are in their own submodules:
//! - [openai] - any OpenAI-compatible chat completions endpoint

pub mod openai;

use crate::adk::error::ModelError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Configuration for model generation
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub top_p: Option<f32>,
}

/// Role of a chat message sent to a model
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A message in the conversation sent to a model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Core trait for LLM model clients
///
/// A client serves every model its endpoint knows; the model identifier is
/// chosen per call so that one client can back agents configured with
/// different models.
#[async_trait]
pub trait Model: Send + Sync {
    async fn generate(
        &self,
        model_name: &str,
        messages: &[ChatMessage],
        config: Option<&GenerationConfig>,
    ) -> Result<String, ModelError>;
}
