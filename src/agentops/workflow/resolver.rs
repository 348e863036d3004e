// SPDX-License-Identifier: MIT

//! Agent resolution for normalized tasks

use std::sync::Arc;

use super::types::{AgentTable, TaskDescriptor};
use crate::agentops::models::Agent;

/// Look up the agent a task delegates to
///
/// A missing agent is not an error: the task is skipped and the rest of the
/// workflow still compiles.
pub fn resolve_agent<'a>(task: &TaskDescriptor, agents: &'a AgentTable) -> Option<&'a Arc<Agent>> {
    let Some(agent_id) = task.agent_id else {
        log::warn!("Task at step {} has no agent reference, skipping", task.step);
        return None;
    };

    let agent = agents.get(agent_id);
    if agent.is_none() {
        log::warn!(
            "Agent {} referenced at step {} not found, skipping",
            agent_id,
            task.step
        );
    }
    agent
}
