// SPDX-License-Identifier: MIT

//! Step nodes - one executable unit per resolvable task

use std::fmt;
use std::sync::Arc;

use crate::adk::error::BoxError;
use crate::agentops::models::Agent;
use crate::agentops::workflow::state::{ExecutionState, StateUpdate};
use crate::agentops::workflow::worker::{StepContext, StepWorker};

/// Derive a node id from the task's position and the agent's display name
///
/// `position` is zero-based in the normalized task list; whitespace in the
/// name becomes `_` so the id is usable as a plain key.
pub fn node_id(position: usize, agent_name: &str) -> String {
    let name: String = agent_name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("step_{}_{}", position + 1, name)
}

/// An executable step closed over its own agent snapshot and instruction
#[derive(Clone)]
pub struct StepNode {
    id: String,
    agent: Arc<Agent>,
    instruction: String,
    worker: Arc<dyn StepWorker>,
}

impl StepNode {
    pub fn new(
        id: impl Into<String>,
        agent: Arc<Agent>,
        instruction: impl Into<String>,
        worker: Arc<dyn StepWorker>,
    ) -> Self {
        Self {
            id: id.into(),
            agent,
            instruction: instruction.into(),
            worker,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Run the step against `state` and return only what it contributes
    pub async fn invoke(&self, state: &ExecutionState) -> Result<StateUpdate, BoxError> {
        let ctx = StepContext {
            agent: &self.agent,
            instruction: &self.instruction,
            state,
        };
        let output = self.worker.perform(ctx).await?;
        Ok(StateUpdate::from_step(&self.agent.name, output))
    }
}

impl fmt::Debug for StepNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepNode")
            .field("id", &self.id)
            .field("agent", &self.agent.name)
            .field("instruction", &self.instruction)
            .field("worker", &self.worker.name())
            .finish()
    }
}
