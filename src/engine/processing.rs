// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::ProcessConfig;
use crate::engine::report::TriggerReport;
use crate::engine::schedule::Schedule;
use crate::engine::status::StatusCode;
use crate::errors::{EngineError, SourceError};
use crate::event::{Event, EventId, LumiId, RunNumber};
use crate::observability::messages::engine::{
    JobEnded, JobStarted, RunCycleFailed, RunCycleFinished, RunCycleStarted,
};
use crate::observability::messages::StructuredLog;
use crate::services::{Activity, ActivityRegistry, Signal};
use crate::traits::{FileBlock, OutputModuleDescription, Source};

/// Event totals readable from any thread while a run is in progress.
#[derive(Debug, Default)]
pub struct EventCounters {
    total: AtomicU64,
    passed: AtomicU64,
}

impl EventCounters {
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn passed(&self) -> u64 {
        self.passed.load(Ordering::Relaxed)
    }

    fn record_event(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    fn record_passed(&self) {
        self.passed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Everything a run cycle mutates. Lives behind the event processor's mutex
/// so exactly one cycle (foreground or background) touches it at a time.
pub(crate) struct ProcessingCore {
    process_name: String,
    schedule: Schedule,
    source: Box<dyn Source>,
    activity: Arc<ActivityRegistry>,
    counters: Arc<EventCounters>,
    max_events: Option<u64>,
    max_output_events: Option<u64>,
    processed_in_cycle: u64,
    begin_outcome: Option<Result<(), EngineError>>,
    job_ended: bool,
    outputs_open: bool,
    open_run: Option<RunNumber>,
    open_lumi: Option<LumiId>,
}

impl ProcessingCore {
    pub(crate) fn new(
        config: &ProcessConfig,
        schedule: Schedule,
        source: Box<dyn Source>,
        activity: Arc<ActivityRegistry>,
        counters: Arc<EventCounters>,
    ) -> Self {
        Self {
            process_name: config.process.clone(),
            schedule,
            source,
            activity,
            counters,
            max_events: config.max_events,
            max_output_events: config.max_output_events,
            processed_in_cycle: 0,
            begin_outcome: None,
            job_ended: false,
            outputs_open: false,
            open_run: None,
            open_lumi: None,
        }
    }

    /// Initialise outputs and modules and fire the begin-job signal.
    ///
    /// Only the first call does anything; later calls return the first
    /// call's outcome.
    pub(crate) async fn begin_job(&mut self) -> Result<(), EngineError> {
        if let Some(outcome) = &self.begin_outcome {
            return outcome.clone();
        }

        let outcome = self.initialise().await;
        self.begin_outcome = Some(outcome.clone());
        outcome
    }

    async fn initialise(&mut self) -> Result<(), EngineError> {
        self.schedule.configure_outputs(&OutputModuleDescription {
            max_events: self.max_output_events,
        });
        self.schedule.begin_job().await?;
        self.activity.fire(Signal::PostBeginJob, &Activity::Job)?;

        JobStarted {
            process: &self.process_name,
            module_count: self.schedule.workers().len(),
            path_count: self.schedule.path_count(),
        }
        .log();
        Ok(())
    }

    /// Close outputs, end the modules' job and fire the end-job signal.
    ///
    /// Runs at most once. Every step is attempted; the first failure is
    /// returned.
    pub(crate) async fn end_job(&mut self) -> Result<(), EngineError> {
        if self.job_ended {
            return Ok(());
        }
        self.job_ended = true;

        let mut first_error = None;

        if self.outputs_open {
            self.outputs_open = false;
            if let Err(error) = self.schedule.close_output_files().await {
                first_error.get_or_insert(error);
            }
        }

        if self.begin_outcome.is_some() {
            if let Err(error) = self.schedule.end_job().await {
                first_error.get_or_insert(error);
            }
        }

        if let Err(error) = self.activity.fire(Signal::PostEndJob, &Activity::Job) {
            first_error.get_or_insert(error.into());
        }

        JobEnded {
            process: &self.process_name,
            total_events: self.counters.total(),
            total_passed: self.counters.passed(),
        }
        .log();

        first_error.map_or(Ok(()), Err)
    }

    /// Process events until the source is exhausted, the event budget is
    /// spent, every output module is full, or `cancel` fires.
    ///
    /// `reset` rewinds the source and restores the event budget first.
    pub(crate) async fn run_cycle(
        &mut self,
        run: Option<RunNumber>,
        reset: bool,
        cancel: &CancellationToken,
    ) -> Result<StatusCode, EngineError> {
        self.begin_job().await?;

        if let Some(run) = run {
            self.source.set_run_number(run);
        }
        if reset {
            self.source.rewind();
            self.processed_in_cycle = 0;
        }

        let msg = RunCycleStarted {
            run,
            reset,
            max_events: self.max_events,
        };
        let span = msg.span("cycle");
        span.in_scope(|| msg.log());

        let started = Instant::now();
        let mut events = 0;
        let outcome = self
            .event_loop(cancel, &mut events)
            .instrument(span.clone())
            .await;

        span.in_scope(|| match &outcome {
            Ok(status) => RunCycleFinished {
                status: status.as_str(),
                events,
                duration: started.elapsed(),
            }
            .log(),
            Err(error) => RunCycleFailed {
                events,
                error,
            }
            .log(),
        });
        outcome
    }

    async fn event_loop(
        &mut self,
        cancel: &CancellationToken,
        events: &mut u64,
    ) -> Result<StatusCode, EngineError> {
        let status = loop {
            tokio::task::yield_now().await;

            if cancel.is_cancelled() {
                break StatusCode::Success;
            }
            if self
                .max_events
                .is_some_and(|max| self.processed_in_cycle >= max)
            {
                break StatusCode::Success;
            }
            if self.schedule.outputs_exhausted() {
                break StatusCode::Success;
            }

            let next = self
                .source
                .next_event()
                .map_err(|source| SourceError::new(self.source.label(), source))?;
            let Some(id) = next else {
                break StatusCode::InputExhausted;
            };

            self.enter(id).await?;
            self.process_one(id).await?;
            *events += 1;
        };

        self.close_boundaries().await?;
        Ok(status)
    }

    /// Open output files on the first event and cross any run or lumi
    /// boundary between the previous event and `id`.
    ///
    /// Full output files are swapped only here, after the ended boundaries
    /// were written, so run and lumi records land in the file that holds
    /// their events and no empty file is left behind at the end of a job.
    async fn enter(&mut self, id: EventId) -> Result<(), EngineError> {
        if !self.outputs_open {
            let file = FileBlock {
                source_label: self.source.label().to_string(),
                process_name: self.process_name.clone(),
            };
            self.schedule.open_output_files(&file).await?;
            self.outputs_open = true;
        }

        let lumi = id.lumi_id();
        if self.open_lumi.is_some_and(|open| open != lumi) {
            self.end_lumi().await?;
        }
        if self.open_run.is_some_and(|open| open != id.run) {
            self.end_run().await?;
        }
        self.schedule.rotate_output_files().await?;

        if self.open_run.is_none() {
            self.activity
                .fire(Signal::PreBeginRun, &Activity::Run(id.run))?;
            self.open_run = Some(id.run);
            self.schedule.begin_run(id.run).await?;
            tokio::task::yield_now().await;
        }
        if self.open_lumi.is_none() {
            self.activity
                .fire(Signal::PreBeginLumi, &Activity::Lumi(lumi))?;
            self.open_lumi = Some(lumi);
            self.schedule.begin_lumi(lumi).await?;
            tokio::task::yield_now().await;
        }
        Ok(())
    }

    async fn process_one(&mut self, id: EventId) -> Result<(), EngineError> {
        let mut event = Event::new(id);
        self.counters.record_event();
        self.processed_in_cycle += 1;

        self.activity
            .fire(Signal::PreProcessEvent, &Activity::Event(id))?;
        let outcome = self.schedule.process_event(&mut event).await;
        let post = self
            .activity
            .fire(Signal::PostProcessEvent, &Activity::Event(id));

        let accepted = outcome?;
        post?;
        if accepted {
            self.counters.record_passed();
        }
        Ok(())
    }

    async fn end_lumi(&mut self) -> Result<(), EngineError> {
        if let Some(lumi) = self.open_lumi.take() {
            self.schedule.end_lumi(lumi).await?;
            self.activity
                .fire(Signal::PostEndLumi, &Activity::Lumi(lumi))?;
            self.schedule.write_lumi(lumi).await?;
        }
        Ok(())
    }

    async fn end_run(&mut self) -> Result<(), EngineError> {
        if let Some(run) = self.open_run.take() {
            self.schedule.end_run(run).await?;
            self.activity.fire(Signal::PostEndRun, &Activity::Run(run))?;
            self.schedule.write_run(run).await?;
        }
        Ok(())
    }

    async fn close_boundaries(&mut self) -> Result<(), EngineError> {
        self.end_lumi().await?;
        self.end_run().await
    }

    pub(crate) fn trigger_report(&self) -> TriggerReport {
        TriggerReport {
            process: self.process_name.clone(),
            total_events: self.counters.total(),
            total_passed: self.counters.passed(),
            paths: self.schedule.path_summaries(),
            modules: self.schedule.module_summaries(),
        }
    }
}
