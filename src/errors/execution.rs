// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::errors::ConfigurationError;
use crate::services::ActivityError;
use crate::worker::ModuleDescription;

/// Error type returned by module hooks and sources.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Shared form of a module's error so annotated errors stay `Clone`.
pub type SharedError = Arc<dyn Error + Send + Sync + 'static>;

/// The lifecycle step a module was executing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    BeginJob,
    EndJob,
    BeginRun,
    EndRun,
    BeginLumi,
    EndLumi,
    Event,
    OpenFile,
    CloseFile,
    OpenNewFileIfNeeded,
    WriteRun,
    WriteLumi,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::BeginJob => "beginJob",
            Phase::EndJob => "endJob",
            Phase::BeginRun => "beginRun",
            Phase::EndRun => "endRun",
            Phase::BeginLumi => "beginLuminosityBlock",
            Phase::EndLumi => "endLuminosityBlock",
            Phase::Event => "event",
            Phase::OpenFile => "openFile",
            Phase::CloseFile => "closeFile",
            Phase::OpenNewFileIfNeeded => "openNewFileIfNeeded",
            Phase::WriteRun => "writeRun",
            Phase::WriteLumi => "writeLuminosityBlock",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure raised inside a module, annotated with the module's identity
/// and the phase it was executing.
#[derive(Debug, Clone)]
pub struct ModuleError {
    pub label: String,
    pub type_name: String,
    pub phase: Phase,
    pub source: SharedError,
}

impl ModuleError {
    pub fn new(description: &ModuleDescription, phase: Phase, source: BoxError) -> Self {
        Self {
            label: description.label().to_string(),
            type_name: description.type_name().to_string(),
            phase,
            source: Arc::from(source),
        }
    }
}

impl fmt::Display for ModuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Module '{}' ({}) failed during {}: {}",
            self.label, self.type_name, self.phase, self.source
        )
    }
}

impl Error for ModuleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// A failure raised by the event source.
#[derive(Debug, Clone)]
pub struct SourceError {
    pub label: String,
    pub source: SharedError,
}

impl SourceError {
    pub fn new(label: &str, source: BoxError) -> Self {
        Self {
            label: label.to_string(),
            source: Arc::from(source),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Source '{}' failed: {}", self.label, self.source)
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Errors surfaced by the event processor's control operations.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Module(#[from] ModuleError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Activity(#[from] ActivityError),

    /// A control operation was issued while an asynchronous run has not yet
    /// been observed to finish.
    #[error("Cannot {operation} while an asynchronous run is in flight")]
    Busy { operation: &'static str },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl EngineError {
    /// The label of the module responsible for this error, when there is one.
    pub fn module_label(&self) -> Option<&str> {
        match self {
            EngineError::Module(e) => Some(&e.label),
            EngineError::Configuration(ConfigurationError::UndeclaredModule { label, .. })
            | EngineError::Configuration(ConfigurationError::DuplicateModuleLabel { label })
            | EngineError::Configuration(ConfigurationError::UnknownModuleType { label, .. })
            | EngineError::Configuration(ConfigurationError::InvalidParameter { label, .. }) => {
                Some(label)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParameterSet;
    use crate::traits::ModuleTag;

    #[test]
    fn module_error_renders_label_type_and_phase() {
        let description =
            ModuleDescription::new("m1", "TestFailuresAnalyzer", ModuleTag::Analyzer, &ParameterSet::new());
        let error = ModuleError::new(&description, Phase::BeginJob, "boom".into());

        let text = error.to_string();
        assert!(text.contains("'m1'"));
        assert!(text.contains("TestFailuresAnalyzer"));
        assert!(text.contains("beginJob"));
        assert!(text.contains("boom"));
        assert!(Error::source(&error).is_some());
    }

    #[test]
    fn engine_error_exposes_module_label() {
        let description =
            ModuleDescription::new("m2", "IntProducer", ModuleTag::Producer, &ParameterSet::new());
        let error: EngineError = ModuleError::new(&description, Phase::Event, "bad".into()).into();
        assert_eq!(error.module_label(), Some("m2"));

        let cloned = error.clone();
        assert_eq!(cloned.to_string(), error.to_string());

        let busy = EngineError::Busy { operation: "run" };
        assert_eq!(busy.module_label(), None);
    }
}
