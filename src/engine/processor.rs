// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The event processor: job lifecycle and run control.
//!
//! An [`EventProcessor`] owns the module graph built from a [`ProcessConfig`]
//! and drives it one event at a time. It offers two control surfaces over the
//! same processing core:
//!
//! - **Foreground**: `begin_job`, `run`, `run_to_completion` and `end_job`
//!   complete before they return.
//! - **Background**: `run_async` spawns one run cycle on the Tokio runtime and
//!   returns immediately; `wait_till_done_async` and `stop_async` join it with
//!   a bounded wait.
//!
//! # Architecture Overview
//!
//! ```text
//!   caller task                       background task
//!   -----------                       ---------------
//!   run_async() ──spawn──────────────▶ core.lock().run_cycle(token)
//!   stop_async(t) ──token.cancel()──▶   (checked at every event boundary)
//!   wait_till_done_async(t) ◀──join── Result<StatusCode, EngineError>
//! ```
//!
//! The processing core sits behind a `tokio::sync::Mutex`, so foreground
//! operations and a background cycle never overlap. Foreground operations
//! issued while a background run has not been observed to finish fail fast
//! with [`EngineError::Busy`] rather than queueing behind it.
//!
//! # Run Control States
//!
//! - `Idle` until the first `run_async`
//! - `Running` while the background cycle is unobserved
//! - `StopRequested` once `stop_async` cancelled it
//! - `Done` / `Failed` after a wait observed the outcome
//!
//! A wait whose budget elapses returns [`StatusCode::TimedOut`] and leaves the
//! run untouched. Once observed, the outcome is kept: later waits and stops
//! return the same status, or re-raise the same error.
//!
//! # Examples
//!
//! ```rust
//! use std::time::Duration;
//! use event_processor::config::{ModuleConfig, ParameterSet, ProcessConfig};
//! use event_processor::engine::{EventProcessor, StatusCode};
//! use event_processor::services::ServiceToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProcessConfig::new("p")
//!     .with_max_events(5)
//!     .with_module(
//!         ModuleConfig::new("m1", "IntProducer")
//!             .with_params(ParameterSet::new().with("ivalue", 10)),
//!     )
//!     .with_path("p1", &["m1"]);
//!
//! let mut processor = EventProcessor::new(&config, ServiceToken::default())?;
//! processor.set_run_number(7)?;
//! processor.run_async()?;
//! let status = processor.wait_till_done_async(Duration::from_secs(5)).await?;
//!
//! assert_eq!(status, StatusCode::Success);
//! assert_eq!(processor.total_events(), 5);
//! processor.end_job().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::backends::ModuleFactory;
use crate::config::{ProcessConfig, ProcessContext};
use crate::engine::processing::{EventCounters, ProcessingCore};
use crate::engine::report::TriggerReport;
use crate::engine::schedule::Schedule;
use crate::engine::status::{RunState, StatusCode};
use crate::errors::EngineError;
use crate::event::RunNumber;
use crate::observability::messages::engine::{
    AsyncRunAbandoned, AsyncRunSpawned, StopRequested, WaitTimedOut,
};
use crate::observability::messages::StructuredLog;
use crate::services::{ActivityRegistry, ServiceToken};
use crate::worker::ModuleDescription;

type CycleOutcome = Result<StatusCode, EngineError>;

struct AsyncRun {
    cancel: CancellationToken,
    handle: JoinHandle<CycleOutcome>,
}

/// Drives a configured module graph over the events of its source.
pub struct EventProcessor {
    context: Arc<ProcessContext>,
    activity: Arc<ActivityRegistry>,
    core: Arc<Mutex<ProcessingCore>>,
    counters: Arc<EventCounters>,
    descriptions: Vec<ModuleDescription>,
    next_run: Option<RunNumber>,
    async_run: Option<AsyncRun>,
    last_outcome: Option<CycleOutcome>,
}

impl EventProcessor {
    /// Build the job with the built-in module types.
    pub fn new(config: &ProcessConfig, services: ServiceToken) -> Result<Self, EngineError> {
        Self::with_factory(config, services, &ModuleFactory::with_builtins())
    }

    /// Build the job, resolving module and source types through `factory`.
    ///
    /// Fails with a [`ConfigurationError`](crate::errors::ConfigurationError)
    /// naming the offending module when a path references an undeclared
    /// label, a type is unknown, or a module rejects its parameters.
    pub fn with_factory(
        config: &ProcessConfig,
        services: ServiceToken,
        factory: &ModuleFactory,
    ) -> Result<Self, EngineError> {
        let activity = services.activity().clone();
        let mut context = ProcessContext::new(&config.process);
        let schedule = Schedule::build(config, factory, &mut context, &activity)?;
        let source = factory.create_source(&config.source)?;
        let counters = Arc::new(EventCounters::default());
        let descriptions = schedule.module_descriptions();

        let core = ProcessingCore::new(config, schedule, source, activity.clone(), counters.clone());

        Ok(Self {
            context: Arc::new(context),
            activity,
            core: Arc::new(Mutex::new(core)),
            counters,
            descriptions,
            next_run: None,
            async_run: None,
            last_outcome: None,
        })
    }

    /// Initialise every module and fire the begin-job signal, once.
    pub async fn begin_job(&mut self) -> Result<(), EngineError> {
        self.ensure_idle("begin the job")?;
        self.core.lock().await.begin_job().await
    }

    /// Process events until the source or the event budget runs out.
    ///
    /// Begins the job first if needed. Does not end the job.
    pub async fn run(&mut self) -> CycleOutcome {
        self.run_to_completion(false).await
    }

    /// Like [`run`](Self::run); with `reset_state` the source is rewound and
    /// the event budget restored before processing.
    pub async fn run_to_completion(&mut self, reset_state: bool) -> CycleOutcome {
        self.ensure_idle("run")?;
        let run = self.next_run.take();
        let never_cancelled = CancellationToken::new();
        self.core
            .lock()
            .await
            .run_cycle(run, reset_state, &never_cancelled)
            .await
    }

    /// Close outputs, end every module's job and fire the end-job signal,
    /// once. Safe to call whether or not any event was processed.
    pub async fn end_job(&mut self) -> Result<(), EngineError> {
        self.ensure_idle("end the job")?;
        self.core.lock().await.end_job().await
    }

    /// Run number for the next run cycle.
    pub fn set_run_number(&mut self, run: RunNumber) -> Result<(), EngineError> {
        self.ensure_idle("set the run number")?;
        self.next_run = Some(run);
        Ok(())
    }

    /// Start a fresh run cycle on the Tokio runtime and return immediately.
    ///
    /// Must be called from within a runtime. Fails with
    /// [`EngineError::Busy`] while a previous asynchronous run has not been
    /// observed through [`wait_till_done_async`](Self::wait_till_done_async)
    /// or [`stop_async`](Self::stop_async).
    pub fn run_async(&mut self) -> Result<(), EngineError> {
        self.ensure_idle("start an asynchronous run")?;
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|e| EngineError::InternalError {
                message: format!("asynchronous runs need a Tokio runtime: {}", e),
            })?;

        let run = self.next_run.take();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let core = self.core.clone();

        let msg = AsyncRunSpawned { run };
        let span = msg.span("background");
        span.in_scope(|| msg.log());
        let handle = runtime.spawn(
            async move {
                let mut core = core.lock().await;
                core.run_cycle(run, true, &token).await
            }
            .instrument(span),
        );

        self.last_outcome = None;
        self.async_run = Some(AsyncRun { cancel, handle });
        Ok(())
    }

    /// Wait up to `timeout` for the asynchronous run to finish.
    ///
    /// `Duration::ZERO` polls without waiting. Returns
    /// [`StatusCode::TimedOut`] when the budget elapses first. With no
    /// unobserved run, returns the last run's outcome again (or `Success`
    /// if there never was one).
    pub async fn wait_till_done_async(&mut self, timeout: Duration) -> CycleOutcome {
        let Some(active) = self.async_run.as_mut() else {
            return self.last_outcome.clone().unwrap_or(Ok(StatusCode::Success));
        };

        let joined = if timeout.is_zero() {
            if !active.handle.is_finished() {
                WaitTimedOut { timeout }.log();
                return Ok(StatusCode::TimedOut);
            }
            (&mut active.handle).await
        } else {
            match tokio::time::timeout(timeout, &mut active.handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    WaitTimedOut { timeout }.log();
                    return Ok(StatusCode::TimedOut);
                }
            }
        };

        self.async_run = None;
        let outcome = joined.unwrap_or_else(|e| {
            Err(EngineError::InternalError {
                message: format!("asynchronous run did not complete: {}", e),
            })
        });
        self.last_outcome = Some(outcome.clone());
        outcome
    }

    /// Ask the asynchronous run to stop at its next event boundary, then
    /// wait up to `timeout` for it to finish.
    pub async fn stop_async(&mut self, timeout: Duration) -> CycleOutcome {
        if let Some(active) = &self.async_run {
            if !active.cancel.is_cancelled() {
                StopRequested { timeout }.log();
                active.cancel.cancel();
            }
        }
        self.wait_till_done_async(timeout).await
    }

    pub fn run_state(&self) -> RunState {
        match (&self.async_run, &self.last_outcome) {
            (Some(active), _) if active.cancel.is_cancelled() => RunState::StopRequested,
            (Some(_), _) => RunState::Running,
            (None, Some(Ok(_))) => RunState::Done,
            (None, Some(Err(_))) => RunState::Failed,
            (None, None) => RunState::Idle,
        }
    }

    /// Events handed to the paths so far, across all cycles.
    pub fn total_events(&self) -> u64 {
        self.counters.total()
    }

    /// Events every trigger path accepted.
    pub fn total_events_passed(&self) -> u64 {
        self.counters.passed()
    }

    /// Every worker's module description, including the implicit trigger
    /// results module when the job has trigger paths.
    pub fn all_module_descriptions(&self) -> &[ModuleDescription] {
        &self.descriptions
    }

    pub async fn trigger_report(&self) -> Result<TriggerReport, EngineError> {
        self.ensure_idle("build the trigger report")?;
        Ok(self.core.lock().await.trigger_report())
    }

    /// The process-scoped parameter registry. Released when the processor
    /// is dropped.
    pub fn context(&self) -> &Arc<ProcessContext> {
        &self.context
    }

    pub fn activity(&self) -> &Arc<ActivityRegistry> {
        &self.activity
    }

    fn ensure_idle(&self, operation: &'static str) -> Result<(), EngineError> {
        match self.async_run {
            Some(_) => Err(EngineError::Busy { operation }),
            None => Ok(()),
        }
    }
}

impl Drop for EventProcessor {
    fn drop(&mut self) {
        if let Some(active) = self.async_run.take() {
            AsyncRunAbandoned.log();
            active.cancel.cancel();
        }
    }
}

impl std::fmt::Debug for EventProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventProcessor")
            .field("process", &self.context.process_name())
            .field("modules", &self.descriptions.len())
            .field("run_state", &self.run_state())
            .field("total_events", &self.total_events())
            .finish()
    }
}
