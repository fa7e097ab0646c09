// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod path;
mod processing;
pub mod processor;
pub mod report;
pub mod schedule;
pub mod status;
mod trigger_inserter;

pub use path::{Path, PathCounters, PathKind};
pub use processing::EventCounters;
pub use processor::EventProcessor;
pub use report::{ModuleSummary, PathSummary, TriggerReport};
pub use schedule::Schedule;
pub use status::{RunState, StatusCode};
