// SPDX-License-Identifier: MIT

//! Agent kit primitives shared by the workflow engine: model clients and
//! the error hierarchy.

pub mod error;
pub mod model;
