// SPDX-License-Identifier: MIT

//! Execution state threaded through a compiled chain
//!
//! This module provides:
//! - `ExecutionState` - the accumulating record of one run
//! - `StateUpdate` - the partial update a single step contributes
//! - `Message` - one entry of the append-only message log

mod store;

pub use store::{ExecutionState, Message, StateUpdate, SYSTEM_AGENT};
