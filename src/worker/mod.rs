// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Module workers and the output communicator.

mod communicator;
mod description;
#[allow(clippy::module_inception)]
mod worker;

pub use communicator::OutputCommunicator;
pub use description::ModuleDescription;
pub use worker::{Worker, WorkerCounters, WorkerParams, WorkerState};
