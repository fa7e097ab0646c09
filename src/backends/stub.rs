// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test-only modules for exercising workers and the event processor.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::backends::ModuleFactory;
use crate::config::ModuleConfig;
use crate::errors::ConfigurationError;
use crate::event::{Event, LumiId, ProductDescription, ProductRegistry, RunNumber};
use crate::traits::{Analyzer, FileBlock, Filter, Module, ModuleKind, ModuleResult, OutputModule};

/// How many times each lifecycle hook of a [`BeginEndJobAnalyzer`] ran, and
/// how many instances were dropped.
#[derive(Debug, Default)]
pub struct JobControl {
    pub begin_job: AtomicUsize,
    pub end_job: AtomicUsize,
    pub begin_run: AtomicUsize,
    pub end_run: AtomicUsize,
    pub begin_lumi: AtomicUsize,
    pub end_lumi: AtomicUsize,
    pub events: AtomicUsize,
    pub drops: AtomicUsize,
}

impl JobControl {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

/// Analyzer recording every hook into a shared [`JobControl`].
pub struct BeginEndJobAnalyzer {
    control: Arc<JobControl>,
    delay: Option<Duration>,
}

impl BeginEndJobAnalyzer {
    pub fn new(control: Arc<JobControl>) -> Self {
        Self {
            control,
            delay: None,
        }
    }

    /// Sleep this long in every event so runs take measurable time.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Module for BeginEndJobAnalyzer {
    async fn begin_job(&mut self) -> ModuleResult {
        bump(&self.control.begin_job);
        Ok(())
    }

    async fn end_job(&mut self) -> ModuleResult {
        bump(&self.control.end_job);
        Ok(())
    }

    async fn begin_run(&mut self, _run: RunNumber) -> ModuleResult {
        bump(&self.control.begin_run);
        Ok(())
    }

    async fn end_run(&mut self, _run: RunNumber) -> ModuleResult {
        bump(&self.control.end_run);
        Ok(())
    }

    async fn begin_lumi(&mut self, _lumi: LumiId) -> ModuleResult {
        bump(&self.control.begin_lumi);
        Ok(())
    }

    async fn end_lumi(&mut self, _lumi: LumiId) -> ModuleResult {
        bump(&self.control.end_lumi);
        Ok(())
    }
}

#[async_trait]
impl Analyzer for BeginEndJobAnalyzer {
    async fn analyze(&mut self, _event: &Event) -> ModuleResult {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        bump(&self.control.events);
        Ok(())
    }
}

impl Drop for BeginEndJobAnalyzer {
    fn drop(&mut self) {
        bump(&self.control.drops);
    }
}

/// Where a [`FailingAnalyzer`] raises its error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    BeginJob,
    Event,
    EndJob,
}

/// Analyzer that fails at one chosen point of its lifecycle.
pub struct FailingAnalyzer {
    point: FailurePoint,
}

impl FailingAnalyzer {
    pub fn new(point: FailurePoint) -> Self {
        Self { point }
    }

    fn fail_at(&self, point: FailurePoint) -> ModuleResult {
        if self.point == point {
            Err(format!("simulated failure at {:?}", point).into())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Module for FailingAnalyzer {
    async fn begin_job(&mut self) -> ModuleResult {
        self.fail_at(FailurePoint::BeginJob)
    }

    async fn end_job(&mut self) -> ModuleResult {
        self.fail_at(FailurePoint::EndJob)
    }
}

#[async_trait]
impl Analyzer for FailingAnalyzer {
    async fn analyze(&mut self, _event: &Event) -> ModuleResult {
        self.fail_at(FailurePoint::Event)
    }
}

/// Filter that rejects every event.
pub struct RejectingFilter;

impl Module for RejectingFilter {}

#[async_trait]
impl Filter for RejectingFilter {
    async fn filter(&mut self, _event: &mut Event) -> ModuleResult<bool> {
        Ok(false)
    }
}

/// Analyzer counting its event and run hook calls.
pub struct CountingAnalyzer {
    calls: Arc<AtomicUsize>,
    runs: Arc<AtomicUsize>,
}

impl CountingAnalyzer {
    pub fn new() -> Self {
        Self {
            calls: Arc::default(),
            runs: Arc::default(),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    pub fn runs(&self) -> Arc<AtomicUsize> {
        self.runs.clone()
    }
}

#[async_trait]
impl Module for CountingAnalyzer {
    async fn begin_run(&mut self, _run: RunNumber) -> ModuleResult {
        self.runs.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[async_trait]
impl Analyzer for CountingAnalyzer {
    async fn analyze(&mut self, _event: &Event) -> ModuleResult {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Output module that records the name of every file-boundary call.
pub struct RecordingOutput {
    log: Arc<Mutex<Vec<&'static str>>>,
    fail_on_open: bool,
    open: bool,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self {
            log: Arc::default(),
            fail_on_open: false,
            open: false,
        }
    }

    pub fn failing_on_open() -> Self {
        Self {
            fail_on_open: true,
            ..Self::new()
        }
    }

    pub fn log(&self) -> Arc<Mutex<Vec<&'static str>>> {
        self.log.clone()
    }

    fn record(&self, call: &'static str) {
        self.log
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);
    }
}

impl Module for RecordingOutput {}

#[async_trait]
impl OutputModule for RecordingOutput {
    async fn write(&mut self, _event: &Event) -> ModuleResult {
        self.record("write");
        Ok(())
    }

    async fn open_file(&mut self, _file: &FileBlock) -> ModuleResult {
        if self.fail_on_open {
            return Err("disk full".into());
        }
        self.open = true;
        self.record("openFile");
        Ok(())
    }

    async fn close_file(&mut self) -> ModuleResult {
        self.open = false;
        self.record("closeFile");
        Ok(())
    }

    async fn open_new_file_if_needed(&mut self) -> ModuleResult {
        self.record("openNewFileIfNeeded");
        Ok(())
    }

    async fn write_run(&mut self, _run: RunNumber) -> ModuleResult {
        self.record("writeRun");
        Ok(())
    }

    async fn write_lumi(&mut self, _lumi: LumiId) -> ModuleResult {
        self.record("writeLuminosityBlock");
        Ok(())
    }

    fn should_close_file(&self) -> bool {
        self.open
    }

    fn selected_products(&self) -> &[ProductDescription] {
        &[]
    }

    fn select_products(&mut self, _registry: &ProductRegistry) {}
}

/// The built-in factory plus the test modules, keyed by type name.
///
/// `TestBeginEndJobAnalyzer` reports into `control`; `TestFailuresAnalyzer`
/// reads its failure point from the `fail_at` parameter (`construction`,
/// `begin_job`, `event` or `end_job`).
pub fn test_factory(control: Arc<JobControl>) -> ModuleFactory {
    let mut factory = ModuleFactory::with_builtins();

    factory.register_module("TestBeginEndJobAnalyzer", move |config: &ModuleConfig| {
        let delay = config
            .params
            .optional_u64(&config.label, "delay_ms")?
            .map(Duration::from_millis);
        let mut analyzer = BeginEndJobAnalyzer::new(control.clone());
        if let Some(delay) = delay {
            analyzer = analyzer.with_delay(delay);
        }
        Ok(ModuleKind::analyzer(analyzer))
    });

    factory.register_module("TestFailuresAnalyzer", |config: &ModuleConfig| {
        let point = match config
            .params
            .get("fail_at")
            .and_then(|value| value.as_str())
            .unwrap_or("event")
        {
            "construction" => {
                return Err(ConfigurationError::invalid(
                    &config.label,
                    "simulated failure during construction",
                ))
            }
            "begin_job" => FailurePoint::BeginJob,
            "end_job" => FailurePoint::EndJob,
            _ => FailurePoint::Event,
        };
        Ok(ModuleKind::analyzer(FailingAnalyzer::new(point)))
    });

    factory.register_module("TestRejectingFilter", |_: &ModuleConfig| {
        Ok(ModuleKind::filter(RejectingFilter))
    });

    factory
}
