// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::fmt::{Display, Formatter};

pub type RunNumber = u32;
pub type LumiNumber = u32;
pub type EventNumber = u64;

/// Identifies a luminosity block within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LumiId {
    pub run: RunNumber,
    pub lumi: LumiNumber,
}

impl LumiId {
    pub fn new(run: RunNumber, lumi: LumiNumber) -> Self {
        Self { run, lumi }
    }
}

impl Display for LumiId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "run {} lumi {}", self.run, self.lumi)
    }
}

/// Identifies one event: run, luminosity block and event number, coarsest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EventId {
    pub run: RunNumber,
    pub lumi: LumiNumber,
    pub event: EventNumber,
}

impl EventId {
    pub fn new(run: RunNumber, lumi: LumiNumber, event: EventNumber) -> Self {
        Self { run, lumi, event }
    }

    pub fn lumi_id(&self) -> LumiId {
        LumiId::new(self.run, self.lumi)
    }
}

impl Display for EventId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "run {} lumi {} event {}", self.run, self.lumi, self.event)
    }
}
