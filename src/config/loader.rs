// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::consts::DEFAULT_SOURCE_TYPE;
use crate::config::ParameterSet;
use crate::errors::ConfigurationError;

/// Main configuration structure for one processing job.
///
/// This is the already-resolved module graph the event processor consumes:
/// the source, every module declaration, and the trigger and end paths that
/// schedule them.
///
/// # Fields
/// * `process` - Name of the process, recorded in trigger results
/// * `max_events` - Events processed per run cycle (optional, unlimited when absent)
/// * `max_output_events` - Events each output module may write (optional)
/// * `source` - The event source (optional, defaults to an unlimited `EmptySource`)
/// * `modules` - Module declarations, referenced by label from paths
/// * `paths` - Trigger paths, evaluated in order for every event
/// * `end_paths` - End paths, evaluated after trigger paths for every event
///
/// # Example
/// ```yaml
/// process: demo
/// max_events: 10
/// source:
///   type: EmptySource
///   params:
///     first_run: 1
/// modules:
///   - label: m1
///     type: IntProducer
///     params:
///       ivalue: 10
/// paths:
///   - name: p1
///     modules: [m1]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessConfig {
    pub process: String,
    #[serde(default)]
    pub max_events: Option<u64>,
    #[serde(default)]
    pub max_output_events: Option<u64>,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
    #[serde(default)]
    pub paths: Vec<PathConfig>,
    #[serde(default)]
    pub end_paths: Vec<PathConfig>,
}

impl ProcessConfig {
    pub fn new(process: impl Into<String>) -> Self {
        Self {
            process: process.into(),
            max_events: None,
            max_output_events: None,
            source: SourceConfig::default(),
            modules: Vec::new(),
            paths: Vec::new(),
            end_paths: Vec::new(),
        }
    }

    pub fn with_max_events(mut self, max_events: u64) -> Self {
        self.max_events = Some(max_events);
        self
    }

    pub fn with_source(mut self, source: SourceConfig) -> Self {
        self.source = source;
        self
    }

    pub fn with_module(mut self, module: ModuleConfig) -> Self {
        self.modules.push(module);
        self
    }

    pub fn with_path(mut self, name: &str, modules: &[&str]) -> Self {
        self.paths.push(PathConfig::new(name, modules));
        self
    }

    pub fn with_end_path(mut self, name: &str, modules: &[&str]) -> Self {
        self.end_paths.push(PathConfig::new(name, modules));
        self
    }

    pub fn module(&self, label: &str) -> Option<&ModuleConfig> {
        self.modules.iter().find(|m| m.label == label)
    }
}

/// Declaration of one module: its label, the type the factory builds, and its parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleConfig {
    pub label: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub params: ParameterSet,
}

impl ModuleConfig {
    pub fn new(label: &str, type_name: &str) -> Self {
        Self {
            label: label.to_string(),
            type_name: type_name.to_string(),
            params: ParameterSet::new(),
        }
    }

    pub fn with_params(mut self, params: ParameterSet) -> Self {
        self.params = params;
        self
    }
}

/// Declaration of the event source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub params: ParameterSet,
}

impl SourceConfig {
    pub fn new(type_name: &str, params: ParameterSet) -> Self {
        Self {
            type_name: type_name.to_string(),
            params,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            type_name: DEFAULT_SOURCE_TYPE.to_string(),
            params: ParameterSet::new(),
        }
    }
}

/// An ordered list of module labels making up one path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    pub name: String,
    #[serde(default)]
    pub modules: Vec<String>,
}

impl PathConfig {
    pub fn new(name: &str, modules: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            modules: modules.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Load a process configuration from a YAML (`.yaml`/`.yml`) or TOML (`.toml`) file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ProcessConfig, ConfigurationError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let content = fs::read_to_string(path).map_err(|e| ConfigurationError::Unreadable {
        path: display.clone(),
        reason: e.to_string(),
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&content).map_err(|e| ConfigurationError::Malformed {
                path: display,
                reason: e.to_string(),
            })
        }
        Some("toml") => toml::from_str(&content).map_err(|e| ConfigurationError::Malformed {
            path: display,
            reason: e.to_string(),
        }),
        _ => Err(ConfigurationError::UnsupportedFormat { path: display }),
    }
}

/// Load a configuration and reject it if validation finds any structural problem.
pub fn load_and_validate_config<P: AsRef<Path>>(
    path: P,
) -> Result<ProcessConfig, Vec<ConfigurationError>> {
    let cfg = load_config(path).map_err(|e| vec![e])?;
    crate::config::validate_process_config(&cfg)?;
    Ok(cfg)
}
