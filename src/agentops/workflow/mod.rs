// SPDX-License-Identifier: MIT

//! Workflow compiler and execution engine

pub mod builder;
pub mod graph;
mod normalizer;
mod resolver;
pub mod state;
pub mod types;
pub mod worker;

pub use builder::{RunOutcome, WorkflowBuilder};
pub use graph::{Chain, RunEvent, StepNode};
pub use normalizer::normalize_tasks;
pub use resolver::resolve_agent;
pub use state::{ExecutionState, Message, StateUpdate};
pub use types::{AgentTable, TaskDescriptor};
pub use worker::{EchoWorker, ModelWorker, PlaceholderWorker, StepContext, StepWorker};
