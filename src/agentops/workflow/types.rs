// SPDX-License-Identifier: MIT

//! Canonical task and lookup types used by the compiler

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::agentops::models::Agent;

/// A task after normalization: alternate spellings and defaults resolved
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TaskDescriptor {
    /// Ordering key; 0 when the task had none
    pub step: i64,
    /// Referenced agent, `None` when the task names no usable reference
    pub agent_id: Option<i64>,
    pub instruction: String,
}

impl TaskDescriptor {
    pub fn new(step: i64, agent_id: impl Into<Option<i64>>, instruction: impl Into<String>) -> Self {
        Self {
            step,
            agent_id: agent_id.into(),
            instruction: instruction.into(),
        }
    }
}

/// Snapshot of the available agents, keyed by id
///
/// Compilation reads this once; later changes to the backing store do not
/// affect a chain that was already built.
#[derive(Debug, Clone, Default)]
pub struct AgentTable {
    agents: HashMap<i64, Arc<Agent>>,
}

impl AgentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, agent: Agent) {
        self.agents.insert(agent.id, Arc::new(agent));
    }

    pub fn get(&self, id: i64) -> Option<&Arc<Agent>> {
        self.agents.get(&id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl FromIterator<Agent> for AgentTable {
    fn from_iter<I: IntoIterator<Item = Agent>>(iter: I) -> Self {
        let mut table = AgentTable::new();
        for agent in iter {
            table.insert(agent);
        }
        table
    }
}
