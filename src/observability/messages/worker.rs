// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for module workers and output file boundaries.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A module instance was built by the factory and wrapped in a worker.
///
/// # Log Level
/// `debug!` - Construction detail
///
/// # Example
/// ```
/// use event_processor::observability::messages::worker::ModuleConstructed;
///
/// let msg = ModuleConstructed {
///     label: "m1",
///     type_name: "IntProducer",
///     kind: "producer",
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct ModuleConstructed<'a> {
    pub label: &'a str,
    pub type_name: &'a str,
    pub kind: &'a str,
}

impl Display for ModuleConstructed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Constructed {} '{}' of type {}",
            self.kind, self.label, self.type_name
        )
    }
}

impl StructuredLog for ModuleConstructed<'_> {
    fn log(&self) {
        tracing::debug!(
            label = self.label,
            type_name = self.type_name,
            kind = self.kind,
            "{}", self
        );
    }
}

/// A module hook is about to run.
///
/// # Log Level
/// `trace!` - Per-hook detail; the span carries the label to everything the
/// hook logs
pub struct ModuleHookStarted<'a> {
    pub label: &'a str,
    pub phase: &'a str,
}

impl Display for ModuleHookStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Module '{}' entering {}", self.label, self.phase)
    }
}

impl StructuredLog for ModuleHookStarted<'_> {
    fn log(&self) {
        tracing::trace!(label = self.label, phase = self.phase, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "module_hook",
            span_name = name,
            label = self.label,
            phase = self.phase,
        )
    }
}

/// A module hook returned an error.
///
/// # Log Level
/// `warn!` - The error is propagated to the caller, which decides severity
pub struct ModuleHookFailed<'a> {
    pub label: &'a str,
    pub phase: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ModuleHookFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Module '{}' failed during {}: {}",
            self.label, self.phase, self.error
        )
    }
}

impl StructuredLog for ModuleHookFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            label = self.label,
            phase = self.phase,
            error = %self.error,
            "{}", self
        );
    }
}

/// An output module opened or closed a file.
///
/// # Log Level
/// `debug!` - File boundary detail
pub struct OutputFileBoundary<'a> {
    pub label: &'a str,
    pub action: &'a str,
    pub file_index: usize,
}

impl Display for OutputFileBoundary<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Output module '{}' {} file #{}",
            self.label, self.action, self.file_index
        )
    }
}

impl StructuredLog for OutputFileBoundary<'_> {
    fn log(&self) {
        tracing::debug!(
            label = self.label,
            action = self.action,
            file_index = self.file_index,
            "{}", self
        );
    }
}

/// End-of-job totals reported by a counting analyzer.
///
/// # Log Level
/// `info!` - Job summary
pub struct EventCountSummary<'a> {
    pub label: &'a str,
    pub events: u64,
    pub runs: u64,
    pub lumis: u64,
}

impl Display for EventCountSummary<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "'{}' saw {} events in {} runs and {} luminosity blocks",
            self.label, self.events, self.runs, self.lumis
        )
    }
}

impl StructuredLog for EventCountSummary<'_> {
    fn log(&self) {
        tracing::info!(
            label = self.label,
            events = self.events,
            runs = self.runs,
            lumis = self.lumis,
            "{}", self
        );
    }
}
