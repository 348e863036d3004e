// SPDX-License-Identifier: MIT

//! Linear chain execution
//!
//! This module provides the step nodes produced per resolvable task and the
//! chain that wires them entry → … → end and runs them in order.

pub mod executor;
mod node;
pub mod types;

pub use executor::Chain;
pub use node::{node_id, StepNode};
pub use types::{Edge, RunEvent, END};
