//! Chain assembly and execution

use std::collections::HashSet;
use tokio::sync::mpsc;

use super::node::StepNode;
use super::types::{Edge, RunEvent, END};
use crate::adk::error::WorkflowError;
use crate::agentops::workflow::state::ExecutionState;

/// A compiled workflow: step nodes in execution order
///
/// Built once per run and consumed by `invoke`.
#[derive(Debug)]
pub struct Chain {
    name: String,
    nodes: Vec<StepNode>,
}

impl Chain {
    /// Wire nodes into a linear chain
    ///
    /// Fails when there is nothing to run or when two nodes share an id.
    pub fn assemble(name: impl Into<String>, nodes: Vec<StepNode>) -> Result<Self, WorkflowError> {
        let name = name.into();
        if nodes.is_empty() {
            return Err(WorkflowError::EmptyChain(name));
        }

        let mut seen = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !seen.insert(node.id()) {
                return Err(WorkflowError::DuplicateNode(node.id().to_string()));
            }
        }

        Ok(Self { name, nodes })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the first step
    pub fn entry(&self) -> &str {
        // assemble rejects empty chains
        self.nodes[0].id()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[StepNode] {
        &self.nodes
    }

    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(StepNode::id).collect()
    }

    /// Sequential edges followed by the terminal edge to `END`
    pub fn edges(&self) -> Vec<Edge<'_>> {
        let ids = self.node_ids();
        let mut edges: Vec<Edge<'_>> = ids
            .windows(2)
            .map(|pair| Edge {
                from: pair[0],
                to: pair[1],
            })
            .collect();
        if let Some(&last) = ids.last() {
            edges.push(Edge {
                from: last,
                to: END,
            });
        }
        edges
    }

    /// Run every step in order and return the final state
    ///
    /// The first failing step aborts the run; the partial state is dropped.
    pub async fn invoke(self, initial: ExecutionState) -> Result<ExecutionState, WorkflowError> {
        self.drive(initial, None).await
    }

    /// Same as `invoke`, reporting progress on `tx`
    ///
    /// A closed receiver does not stop the run.
    pub async fn invoke_stream(
        self,
        initial: ExecutionState,
        tx: mpsc::Sender<RunEvent>,
    ) -> Result<ExecutionState, WorkflowError> {
        let result = self.drive(initial, Some(&tx)).await;
        let event = match &result {
            Ok(state) => RunEvent::Finished {
                state: state.clone(),
            },
            Err(WorkflowError::StepFailed { node_id, source }) => RunEvent::Failed {
                node_id: Some(node_id.clone()),
                error: source.to_string(),
            },
            Err(e) => RunEvent::Failed {
                node_id: None,
                error: e.to_string(),
            },
        };
        let _ = tx.send(event).await;
        result
    }

    async fn drive(
        self,
        initial: ExecutionState,
        tx: Option<&mpsc::Sender<RunEvent>>,
    ) -> Result<ExecutionState, WorkflowError> {
        log::info!(
            "Running chain '{}' with {} steps, entry {}",
            self.name,
            self.nodes.len(),
            self.entry()
        );

        let mut state = initial;
        for node in &self.nodes {
            log::debug!("Executing node: {}", node.id());
            if let Some(tx) = tx {
                let _ = tx
                    .send(RunEvent::StepStarted {
                        node_id: node.id().to_string(),
                        agent: node.agent().name.clone(),
                    })
                    .await;
            }

            let update = node.invoke(&state).await.map_err(|source| {
                log::error!("Node {} failed: {}", node.id(), source);
                WorkflowError::StepFailed {
                    node_id: node.id().to_string(),
                    source,
                }
            })?;

            if let Some(tx) = tx {
                let _ = tx
                    .send(RunEvent::StepCompleted {
                        node_id: node.id().to_string(),
                        update: update.clone(),
                    })
                    .await;
            }
            state.apply(update);
            log::debug!("Node {} completed", node.id());
        }

        log::info!("Chain '{}' finished", self.name);
        Ok(state)
    }
}
