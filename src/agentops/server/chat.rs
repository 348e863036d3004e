// SPDX-License-Identifier: MIT

//! Single-agent chat backed by a one-node chain

use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::error::ApiError;
use crate::agentops::models::{Agent, AgentDraft};
use crate::agentops::workflow::graph::node_id;
use crate::agentops::workflow::{Chain, EchoWorker, ExecutionState, Message, StepNode};

const CHAT_AGENT: &str = "agent";

#[derive(Debug, Deserialize)]
pub(super) struct ChatRequest {
    #[serde(default)]
    messages: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub(super) struct ChatReply {
    role: String,
    content: String,
}

/// Accept `{role, content}` objects, coercing unknown roles to "user"
fn parse_messages(raw: &[Value]) -> Result<Vec<Message>, ApiError> {
    raw.iter()
        .map(|value| {
            let role = value.get("role").and_then(Value::as_str);
            let content = value.get("content").and_then(Value::as_str);
            match (role, content) {
                (Some(role), Some(content)) => {
                    let role = match role {
                        "assistant" => "assistant",
                        _ => "user",
                    };
                    Ok(Message::new(role, content))
                }
                _ => Err(ApiError::BadRequest("Invalid message format".to_string())),
            }
        })
        .collect()
}

fn chat_chain() -> Result<Chain, ApiError> {
    let agent = Agent::from_draft(
        0,
        AgentDraft {
            name: CHAT_AGENT.to_string(),
            description: None,
            model: crate::agentops::models::DEFAULT_MODEL.to_string(),
            system_prompt: String::new(),
        },
    );
    let node = StepNode::new(
        node_id(0, CHAT_AGENT),
        Arc::new(agent),
        String::new(),
        Arc::new(EchoWorker),
    );
    Chain::assemble("chat", vec![node]).map_err(ApiError::from_workflow)
}

pub(super) async fn chat(Json(request): Json<ChatRequest>) -> Result<Json<ChatReply>, ApiError> {
    let messages = parse_messages(&request.messages)?;
    let state = chat_chain()?
        .invoke(ExecutionState::with_messages(messages))
        .await
        .map_err(ApiError::from_workflow)?;

    let content = state
        .last_message()
        .map(|m| m.content.clone())
        .unwrap_or_default();

    Ok(Json(ChatReply {
        role: "assistant".to_string(),
        content,
    }))
}
