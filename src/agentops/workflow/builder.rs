// SPDX-License-Identifier: MIT

//! Workflow builder - compiles workflow records into runnable chains
//!
//! Compilation is normalize → resolve → build nodes → assemble. Tasks whose
//! agent cannot be resolved are dropped; everything else that goes wrong
//! aborts the compilation. Streaming callers compile first and then drive
//! the chain with `Chain::invoke_stream`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::graph::{node_id, Chain, StepNode};
use super::normalizer::normalize_tasks;
use super::resolver::resolve_agent;
use super::state::{ExecutionState, Message};
use super::types::AgentTable;
use super::worker::StepWorker;
use crate::adk::error::WorkflowError;
use crate::agentops::models::Workflow;

/// What a finished run hands back to its caller
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RunOutcome {
    pub results: BTreeMap<String, String>,
    pub messages: Vec<Message>,
}

impl From<ExecutionState> for RunOutcome {
    fn from(state: ExecutionState) -> Self {
        Self {
            results: state.results,
            messages: state.messages,
        }
    }
}

/// Compiles workflows against an agent snapshot, sharing one step worker
#[derive(Clone)]
pub struct WorkflowBuilder {
    worker: Arc<dyn StepWorker>,
}

impl WorkflowBuilder {
    pub fn new(worker: Arc<dyn StepWorker>) -> Self {
        Self { worker }
    }

    pub fn worker_name(&self) -> &str {
        self.worker.name()
    }

    /// Build the chain for `workflow`
    pub fn compile(&self, workflow: &Workflow, agents: &AgentTable) -> Result<Chain, WorkflowError> {
        let tasks = normalize_tasks(&workflow.tasks)?;

        let nodes: Vec<StepNode> = tasks
            .iter()
            .enumerate()
            .filter_map(|(position, task)| {
                let agent = resolve_agent(task, agents)?;
                Some(StepNode::new(
                    node_id(position, &agent.name),
                    agent.clone(),
                    task.instruction.clone(),
                    self.worker.clone(),
                ))
            })
            .collect();

        log::info!(
            "Compiled workflow '{}': {} of {} tasks resolved",
            workflow.name,
            nodes.len(),
            tasks.len()
        );

        Chain::assemble(workflow.name.clone(), nodes)
    }

    /// Compile `workflow` and run it from `initial`
    pub async fn run(
        &self,
        workflow: &Workflow,
        agents: &AgentTable,
        initial: ExecutionState,
    ) -> Result<RunOutcome, WorkflowError> {
        let chain = self.compile(workflow, agents)?;
        let state = chain.invoke(initial).await?;
        Ok(state.into())
    }
}
