// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;

use crate::engine::path::{PathCounters, PathKind};
use crate::traits::ModuleTag;
use crate::worker::WorkerCounters;

/// Summary of one path's decisions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSummary {
    pub name: String,
    pub kind: PathKind,
    pub position: usize,
    pub modules: Vec<String>,
    #[serde(flatten)]
    pub counters: PathCounters,
}

/// Summary of one worker's event hook outcomes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleSummary {
    pub label: String,
    pub type_name: String,
    pub kind: ModuleTag,
    #[serde(flatten)]
    pub counters: WorkerCounters,
}

/// Per-path and per-module counts for the job so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerReport {
    pub process: String,
    pub total_events: u64,
    pub total_passed: u64,
    pub paths: Vec<PathSummary>,
    pub modules: Vec<ModuleSummary>,
}

impl TriggerReport {
    pub fn path(&self, name: &str) -> Option<&PathSummary> {
        self.paths.iter().find(|p| p.name == name)
    }

    pub fn module(&self, label: &str) -> Option<&ModuleSummary> {
        self.modules.iter().find(|m| m.label == label)
    }
}
