// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration loading and schedule assembly.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// A configuration file was read and parsed.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use event_processor::observability::messages::config::ConfigurationLoaded;
///
/// let msg = ConfigurationLoaded {
///     path: "job.yaml",
///     process: "TEST",
///     module_count: 3,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ConfigurationLoaded<'a> {
    pub path: &'a str,
    pub process: &'a str,
    pub module_count: usize,
}

impl Display for ConfigurationLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded configuration '{}' for process '{}' with {} modules",
            self.path, self.process, self.module_count
        )
    }
}

impl StructuredLog for ConfigurationLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = self.path,
            process = self.process,
            module_count = self.module_count,
            "{}", self
        );
    }
}

/// A declared module is not referenced by any path and will not run.
///
/// # Log Level
/// `warn!` - Likely a configuration mistake
pub struct UnusedModule<'a> {
    pub label: &'a str,
}

impl Display for UnusedModule<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Module '{}' is declared but not on any path; it will not be scheduled",
            self.label
        )
    }
}

impl StructuredLog for UnusedModule<'_> {
    fn log(&self) {
        tracing::warn!(label = self.label, "{}", self);
    }
}

/// Validation rejected the configuration.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ConfigurationRejected<'a> {
    pub error_count: usize,
    pub first: &'a dyn std::error::Error,
}

impl Display for ConfigurationRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Configuration rejected with {} errors, first: {}",
            self.error_count, self.first
        )
    }
}

impl StructuredLog for ConfigurationRejected<'_> {
    fn log(&self) {
        tracing::error!(
            error_count = self.error_count,
            first = %self.first,
            "{}", self
        );
    }
}
