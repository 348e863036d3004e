// SPDX-License-Identifier: MIT

//! Agent and workflow records
//!
//! These are the persisted shapes handled by the record store and the HTTP
//! API. The workflow task list is kept in its raw, schema-loose form; it is
//! only decoded when a workflow is compiled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gpt-4o";

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// A named model configuration with a system prompt
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Agent {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating an agent; the store assigns id and timestamps
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    pub system_prompt: String,
}

/// Partial update for an agent; only provided fields are applied
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AgentPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
}

impl Agent {
    pub fn from_draft(id: i64, draft: AgentDraft) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: draft.name,
            description: draft.description,
            model: draft.model,
            system_prompt: draft.system_prompt,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: AgentPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(model) = patch.model {
            self.model = model;
        }
        if let Some(system_prompt) = patch.system_prompt {
            self.system_prompt = system_prompt;
        }
        self.updated_at = Utc::now();
    }
}

/// Lifecycle status of a workflow
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    #[default]
    Draft,
    Active,
    Archived,
}

/// A workflow's task collection as it was submitted
///
/// Clients send either a JSON list or the same list encoded as a string.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum RawTasks {
    List(Vec<serde_json::Value>),
    Encoded(String),
}

impl Default for RawTasks {
    fn default() -> Self {
        RawTasks::List(Vec::new())
    }
}

/// A named, ordered collection of tasks delegated to agents
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Workflow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: WorkflowStatus,
    #[serde(default)]
    pub tasks: RawTasks,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a workflow
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: WorkflowStatus,
    #[serde(default)]
    pub tasks: RawTasks,
}

impl Workflow {
    pub fn from_draft(id: i64, draft: WorkflowDraft) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: draft.name,
            description: draft.description,
            status: draft.status,
            tasks: draft.tasks,
            created_at: now,
            updated_at: now,
        }
    }
}
