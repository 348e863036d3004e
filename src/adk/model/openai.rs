// SPDX-License-Identifier: MIT

//! OpenAI Model - chat completions API implementation

use super::{ChatMessage, GenerationConfig, Model};
use crate::adk::error::ModelError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for an OpenAI-compatible chat completions endpoint
pub struct OpenAIModel {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIModel {
    /// Create a new OpenAIModel
    ///
    /// `base_url` defaults to the public OpenAI API when `None`.
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Result<Self, ModelError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ModelError::ApiKeyMissing("OpenAI".to_string()))?;
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request_body(
        model_name: &str,
        messages: &[ChatMessage],
        config: Option<&GenerationConfig>,
    ) -> Value {
        let mut body = json!({
            "model": model_name,
            "messages": messages,
        });

        if let Some(cfg) = config {
            if let Some(temp) = cfg.temperature {
                body["temperature"] = json!(temp);
            }
            if let Some(max_tokens) = cfg.max_output_tokens {
                body["max_tokens"] = json!(max_tokens);
            }
            if let Some(top_p) = cfg.top_p {
                body["top_p"] = json!(top_p);
            }
        }

        body
    }

    /// Pull the text of the first choice out of a completions response
    fn parse_response(response: &Value) -> Result<String, ModelError> {
        let choice = response["choices"]
            .as_array()
            .and_then(|c| c.first())
            .ok_or_else(|| ModelError::InvalidResponse("no choices in response".to_string()))?;

        choice["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ModelError::InvalidResponse("choice has no text content".to_string()))
    }
}

#[async_trait]
impl Model for OpenAIModel {
    async fn generate(
        &self,
        model_name: &str,
        messages: &[ChatMessage],
        config: Option<&GenerationConfig>,
    ) -> Result<String, ModelError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::request_body(model_name, messages, config);

        log::debug!(
            "Sending {} messages to {} (model {})",
            messages.len(),
            url,
            model_name
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            log::error!("OpenAI API error {}: {}", status, message);
            return Err(ModelError::Api {
                provider: "OpenAI".to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let json: Value = response.json().await?;
        Self::parse_response(&json)
    }
}
