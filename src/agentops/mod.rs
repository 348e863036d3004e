// SPDX-License-Identifier: MIT

pub mod config;
pub mod loader;
pub mod models;
pub mod server;
pub mod store;
pub mod workflow;
