// SPDX-License-Identifier: MIT

//! Catalog loader - YAML file loading and parsing
//!
//! A catalog seeds the record store with agents and workflows:
//!
//! ```yaml
//! agents:
//!   - id: 1
//!     name: Assistant
//!     system_prompt: "You are helpful."
//! workflows:
//!   - id: 1
//!     name: Greeting
//!     tasks:
//!       - { step: 1, agent_id: 1, instruction: "Say hello" }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::adk::error::AgentOpsError;
use crate::agentops::models::{Agent, Workflow};
use crate::agentops::store::RecordStore;

/// Agents and workflows read from one YAML document
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Catalog {
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub workflows: Vec<Workflow>,
}

/// Loads catalogs from YAML files
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load a catalog from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Catalog, AgentOpsError> {
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse a catalog from a YAML string
    pub fn parse_yaml(content: &str) -> Result<Catalog, AgentOpsError> {
        let catalog: Catalog = serde_yaml::from_str(content)?;
        Ok(catalog)
    }
}

impl Catalog {
    /// Insert every record into `store`, keeping the catalog's ids
    pub async fn seed(self, store: &RecordStore) {
        let (agents, workflows) = (self.agents.len(), self.workflows.len());
        for agent in self.agents {
            store.insert_agent(agent).await;
        }
        for workflow in self.workflows {
            store.insert_workflow(workflow).await;
        }
        log::info!("Seeded {} agents and {} workflows", agents, workflows);
    }
}
