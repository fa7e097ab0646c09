use async_trait::async_trait;

use crate::config::ModuleConfig;
use crate::errors::ConfigurationError;
use crate::event::{Event, LumiId, RunNumber};
use crate::observability::messages::worker::EventCountSummary;
use crate::observability::messages::StructuredLog;
use crate::traits::{Analyzer, Module, ModuleResult};

/// Analyzer that counts events, runs and luminosity blocks.
///
/// With `expected_events` set, the end of the job fails when the count differs.
pub struct EventCounter {
    label: String,
    expected: Option<u64>,
    events: u64,
    runs: u64,
    lumis: u64,
}

impl EventCounter {
    pub fn from_config(config: &ModuleConfig) -> Result<Self, ConfigurationError> {
        Ok(Self {
            label: config.label.clone(),
            expected: config.params.optional_u64(&config.label, "expected_events")?,
            events: 0,
            runs: 0,
            lumis: 0,
        })
    }
}

#[async_trait]
impl Module for EventCounter {
    async fn end_job(&mut self) -> ModuleResult {
        EventCountSummary {
            label: &self.label,
            events: self.events,
            runs: self.runs,
            lumis: self.lumis,
        }
        .log();

        match self.expected {
            Some(expected) if expected != self.events => {
                Err(format!("expected {} events but saw {}", expected, self.events).into())
            }
            _ => Ok(()),
        }
    }

    async fn begin_run(&mut self, _run: RunNumber) -> ModuleResult {
        self.runs += 1;
        Ok(())
    }

    async fn begin_lumi(&mut self, _lumi: LumiId) -> ModuleResult {
        self.lumis += 1;
        Ok(())
    }
}

#[async_trait]
impl Analyzer for EventCounter {
    async fn analyze(&mut self, _event: &Event) -> ModuleResult {
        self.events += 1;
        Ok(())
    }
}
