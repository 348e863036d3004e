// SPDX-License-Identifier: MIT

//! Runtime state storage for workflow execution

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Actor recorded in a fresh state before any step has run
pub const SYSTEM_AGENT: &str = "system";

/// One entry of the message log
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            name: None,
        }
    }

    /// An assistant message attributed to an agent
    pub fn assistant(content: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
            name: Some(name.into()),
        }
    }
}

/// The record threaded through a chain
///
/// Fields merge differently: `messages` appends, `results` overwrites per
/// key, and `current_agent` is replaced.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ExecutionState {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default = "system_agent")]
    pub current_agent: String,
    #[serde(default)]
    pub results: BTreeMap<String, String>,
}

fn system_agent() -> String {
    SYSTEM_AGENT.to_string()
}

impl Default for ExecutionState {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            current_agent: system_agent(),
            results: BTreeMap::new(),
        }
    }
}

impl ExecutionState {
    /// A fresh state seeded with an existing conversation
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Merge a step's partial update into this state
    pub fn apply(&mut self, update: StateUpdate) {
        self.messages.extend(update.messages);
        for (agent, output) in update.results {
            self.results.insert(agent, output);
        }
        if let Some(agent) = update.current_agent {
            self.current_agent = agent;
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// The fields one step contributes; anything left empty is untouched
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct StateUpdate {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub results: BTreeMap<String, String>,
    #[serde(default)]
    pub current_agent: Option<String>,
}

impl StateUpdate {
    /// The update produced by an agent step: one attributed message and
    /// one result entry carrying the same text.
    pub fn from_step(agent_name: &str, output: String) -> Self {
        let mut results = BTreeMap::new();
        results.insert(agent_name.to_string(), output.clone());
        Self {
            messages: vec![Message::assistant(output, agent_name)],
            results,
            current_agent: Some(agent_name.to_string()),
        }
    }
}
