// SPDX-License-Identifier: MIT

//! In-process record store for agents and workflows

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::agentops::models::{Agent, AgentDraft, AgentPatch, Workflow, WorkflowDraft};
use crate::agentops::workflow::AgentTable;

#[derive(Debug, Default)]
struct Records {
    agents: BTreeMap<i64, Agent>,
    workflows: BTreeMap<i64, Workflow>,
    last_agent_id: i64,
    last_workflow_id: i64,
}

/// Key-value store keyed by integer primary key
///
/// Clones share the same records.
#[derive(Clone, Default)]
pub struct RecordStore {
    records: Arc<RwLock<Records>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_agent(&self, draft: AgentDraft) -> Agent {
        let mut records = self.records.write().await;
        records.last_agent_id += 1;
        let agent = Agent::from_draft(records.last_agent_id, draft);
        records.agents.insert(agent.id, agent.clone());
        agent
    }

    /// Insert an agent with its own id, replacing any existing record
    pub async fn insert_agent(&self, agent: Agent) {
        let mut records = self.records.write().await;
        records.last_agent_id = records.last_agent_id.max(agent.id);
        records.agents.insert(agent.id, agent);
    }

    pub async fn get_agent(&self, id: i64) -> Option<Agent> {
        self.records.read().await.agents.get(&id).cloned()
    }

    pub async fn list_agents(&self) -> Vec<Agent> {
        self.records.read().await.agents.values().cloned().collect()
    }

    pub async fn update_agent(&self, id: i64, patch: AgentPatch) -> Option<Agent> {
        let mut records = self.records.write().await;
        let agent = records.agents.get_mut(&id)?;
        agent.apply(patch);
        Some(agent.clone())
    }

    pub async fn delete_agent(&self, id: i64) -> bool {
        self.records.write().await.agents.remove(&id).is_some()
    }

    /// Snapshot of every agent for one compilation
    pub async fn agent_table(&self) -> AgentTable {
        self.records
            .read()
            .await
            .agents
            .values()
            .cloned()
            .collect()
    }

    pub async fn create_workflow(&self, draft: WorkflowDraft) -> Workflow {
        let mut records = self.records.write().await;
        records.last_workflow_id += 1;
        let workflow = Workflow::from_draft(records.last_workflow_id, draft);
        records.workflows.insert(workflow.id, workflow.clone());
        workflow
    }

    /// Insert a workflow with its own id, replacing any existing record
    pub async fn insert_workflow(&self, workflow: Workflow) {
        let mut records = self.records.write().await;
        records.last_workflow_id = records.last_workflow_id.max(workflow.id);
        records.workflows.insert(workflow.id, workflow);
    }

    pub async fn get_workflow(&self, id: i64) -> Option<Workflow> {
        self.records.read().await.workflows.get(&id).cloned()
    }

    pub async fn list_workflows(&self) -> Vec<Workflow> {
        self.records
            .read()
            .await
            .workflows
            .values()
            .cloned()
            .collect()
    }

    pub async fn delete_workflow(&self, id: i64) -> bool {
        self.records.write().await.workflows.remove(&id).is_some()
    }
}
