// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for job lifecycle and run-control events.
//!
//! This module contains message types for logging events related to:
//! * Job begin and end
//! * Run cycles (start, finish, failure)
//! * Asynchronous run control (spawn, stop, timeouts)

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// The job has begun: modules initialised and the begin-job signal fired.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use event_processor::observability::messages::engine::JobStarted;
///
/// let msg = JobStarted {
///     process: "TEST",
///     module_count: 2,
///     path_count: 1,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct JobStarted<'a> {
    pub process: &'a str,
    pub module_count: usize,
    pub path_count: usize,
}

impl Display for JobStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Job '{}' started: {} modules on {} paths",
            self.process, self.module_count, self.path_count
        )
    }
}

impl StructuredLog for JobStarted<'_> {
    fn log(&self) {
        tracing::info!(
            process = self.process,
            module_count = self.module_count,
            path_count = self.path_count,
            "{}", self
        );
    }
}

/// The job has ended.
///
/// # Log Level
/// `info!` - Important operational event
pub struct JobEnded<'a> {
    pub process: &'a str,
    pub total_events: u64,
    pub total_passed: u64,
}

impl Display for JobEnded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Job '{}' ended: {} events processed, {} passed",
            self.process, self.total_events, self.total_passed
        )
    }
}

impl StructuredLog for JobEnded<'_> {
    fn log(&self) {
        tracing::info!(
            process = self.process,
            total_events = self.total_events,
            total_passed = self.total_passed,
            "{}", self
        );
    }
}

/// A run cycle is starting.
///
/// # Log Level
/// `debug!` - Per-cycle detail
pub struct RunCycleStarted {
    pub run: Option<u32>,
    pub reset: bool,
    pub max_events: Option<u64>,
}

impl Display for RunCycleStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.run {
            Some(run) => write!(f, "Starting run cycle for run {}", run)?,
            None => write!(f, "Starting run cycle")?,
        }
        if self.reset {
            write!(f, " (source rewound)")?;
        }
        Ok(())
    }
}

impl StructuredLog for RunCycleStarted {
    fn log(&self) {
        tracing::debug!(
            run = ?self.run,
            reset = self.reset,
            max_events = ?self.max_events,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run_cycle",
            span_name = name,
            run = ?self.run,
            reset = self.reset,
            max_events = ?self.max_events,
        )
    }
}

/// A run cycle finished without error.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use event_processor::observability::messages::engine::RunCycleFinished;
/// use std::time::Duration;
///
/// let msg = RunCycleFinished {
///     status: "InputExhausted",
///     events: 20,
///     duration: Duration::from_millis(3),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct RunCycleFinished<'a> {
    pub status: &'a str,
    pub events: u64,
    pub duration: Duration,
}

impl Display for RunCycleFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Run cycle finished with {}: {} events in {:?}",
            self.status, self.events, self.duration
        )
    }
}

impl StructuredLog for RunCycleFinished<'_> {
    fn log(&self) {
        tracing::info!(
            status = self.status,
            events = self.events,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// A run cycle was aborted by an error.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct RunCycleFailed<'a> {
    pub events: u64,
    pub error: &'a dyn std::error::Error,
}

impl Display for RunCycleFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Run cycle aborted after {} events: {}",
            self.events, self.error
        )
    }
}

impl StructuredLog for RunCycleFailed<'_> {
    fn log(&self) {
        tracing::error!(
            events = self.events,
            error = %self.error,
            "{}", self
        );
    }
}

/// A background run was spawned.
///
/// # Log Level
/// `info!` - Important operational event
pub struct AsyncRunSpawned {
    pub run: Option<u32>,
}

impl Display for AsyncRunSpawned {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.run {
            Some(run) => write!(f, "Spawned asynchronous run for run {}", run),
            None => write!(f, "Spawned asynchronous run"),
        }
    }
}

impl StructuredLog for AsyncRunSpawned {
    fn log(&self) {
        tracing::info!(run = ?self.run, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("async_run", span_name = name, run = ?self.run)
    }
}

/// The caller asked the background run to stop.
///
/// # Log Level
/// `info!` - Important operational event
pub struct StopRequested {
    pub timeout: Duration,
}

impl Display for StopRequested {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stop requested for asynchronous run (waiting up to {:?})",
            self.timeout
        )
    }
}

impl StructuredLog for StopRequested {
    fn log(&self) {
        tracing::info!(timeout_ms = self.timeout.as_millis() as u64, "{}", self);
    }
}

/// A wait on the background run exceeded its budget.
///
/// # Log Level
/// `debug!` - Expected during polling
pub struct WaitTimedOut {
    pub timeout: Duration,
}

impl Display for WaitTimedOut {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Asynchronous run still active after waiting {:?}",
            self.timeout
        )
    }
}

impl StructuredLog for WaitTimedOut {
    fn log(&self) {
        tracing::debug!(timeout_ms = self.timeout.as_millis() as u64, "{}", self);
    }
}

/// The processor was dropped while a background run was still active.
///
/// # Log Level
/// `warn!` - Unobserved work is being cancelled
pub struct AsyncRunAbandoned;

impl Display for AsyncRunAbandoned {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Event processor dropped with an unobserved asynchronous run; cancelling it"
        )
    }
}

impl StructuredLog for AsyncRunAbandoned {
    fn log(&self) {
        tracing::warn!("{}", self);
    }
}
