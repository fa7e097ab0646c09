// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structural validation of a process configuration.
//!
//! Validation runs before any module is constructed so that every problem in
//! the module graph is reported at once, rather than one per attempt:
//!
//! 1. **Process name** - must not be empty
//! 2. **Label uniqueness** - no two modules share a label
//! 3. **Path name uniqueness** - across trigger and end paths
//! 4. **Reference resolution** - every label a path lists is declared
//!
//! Parameter checks are left to the modules themselves, which reject bad
//! values when the factory builds them.

use std::collections::HashSet;

use crate::config::ProcessConfig;
use crate::errors::ConfigurationError;

/// Validate a configuration's module graph.
///
/// # Returns
///
/// * `Ok(())` - every path resolves and all names are unique
/// * `Err(Vec<ConfigurationError>)` - all problems found, in discovery order
///
/// # Example
/// ```rust
/// use event_processor::config::{validate_process_config, ProcessConfig};
///
/// let cfg = ProcessConfig::new("p").with_path("p1", &["m1"]);
/// let errors = validate_process_config(&cfg).unwrap_err();
/// assert!(errors[0].to_string().contains("m1"));
/// ```
pub fn validate_process_config(config: &ProcessConfig) -> Result<(), Vec<ConfigurationError>> {
    let mut errors = Vec::new();

    if config.process.trim().is_empty() {
        errors.push(ConfigurationError::EmptyProcessName);
    }

    let mut labels = HashSet::new();
    for module in &config.modules {
        if !labels.insert(module.label.as_str()) {
            errors.push(ConfigurationError::DuplicateModuleLabel {
                label: module.label.clone(),
            });
        }
    }

    let mut path_names = HashSet::new();
    for path in config.paths.iter().chain(config.end_paths.iter()) {
        if !path_names.insert(path.name.as_str()) {
            errors.push(ConfigurationError::DuplicatePathName {
                name: path.name.clone(),
            });
        }

        for label in &path.modules {
            if !labels.contains(label.as_str()) {
                errors.push(ConfigurationError::UndeclaredModule {
                    path: path.name.clone(),
                    label: label.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
