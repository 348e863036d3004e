//! Chain type definitions

use serde::{Deserialize, Serialize};

use crate::agentops::workflow::state::{ExecutionState, StateUpdate};

/// Name of the terminal target in edge listings and events
pub const END: &str = "__end__";

/// A directed link between two consecutive steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge<'a> {
    pub from: &'a str,
    /// Next node id, or `END` for the terminal edge
    pub to: &'a str,
}

/// Progress reported while a chain runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    StepStarted {
        node_id: String,
        agent: String,
    },
    StepCompleted {
        node_id: String,
        update: StateUpdate,
    },
    Finished {
        state: ExecutionState,
    },
    Failed {
        node_id: Option<String>,
        error: String,
    },
}
