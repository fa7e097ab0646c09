// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised while turning a process configuration into a runnable job.
///
/// Every variant that concerns a module carries the module's label so the
/// rendered message alone identifies the offender.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// A path lists a module label that no module declaration provides.
    #[error("Path '{path}' references module '{label}' which is not declared")]
    UndeclaredModule { path: String, label: String },

    /// Two module declarations share a label.
    #[error("Duplicate module label: '{label}'")]
    DuplicateModuleLabel { label: String },

    /// Two paths (trigger or end) share a name.
    #[error("Duplicate path name: '{name}'")]
    DuplicatePathName { name: String },

    /// The factory has no constructor registered for the declared type.
    #[error("Module '{label}' has unknown type '{type_name}'")]
    UnknownModuleType { label: String, type_name: String },

    /// The source type is not registered with the factory.
    #[error("Source has unknown type '{type_name}'")]
    UnknownSourceType { type_name: String },

    /// A module refused its parameters.
    #[error("Module '{label}' rejected its configuration: {reason}")]
    InvalidParameter { label: String, reason: String },

    /// The process name is empty.
    #[error("Process name must not be empty")]
    EmptyProcessName,

    /// The configuration file could not be read.
    #[error("Unable to read configuration '{path}': {reason}")]
    Unreadable { path: String, reason: String },

    /// The configuration file could not be parsed.
    #[error("Malformed configuration '{path}': {reason}")]
    Malformed { path: String, reason: String },

    /// The configuration file extension is not a supported format.
    #[error("Unsupported configuration format for '{path}' (expected .yaml, .yml or .toml)")]
    UnsupportedFormat { path: String },
}

impl ConfigurationError {
    /// Shorthand for a parameter rejection.
    pub fn invalid(label: &str, reason: impl Into<String>) -> Self {
        ConfigurationError::InvalidParameter {
            label: label.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_module_label() {
        let cases = vec![
            ConfigurationError::UndeclaredModule {
                path: "p1".into(),
                label: "m1".into(),
            },
            ConfigurationError::DuplicateModuleLabel { label: "m1".into() },
            ConfigurationError::UnknownModuleType {
                label: "m1".into(),
                type_name: "Nope".into(),
            },
            ConfigurationError::invalid("m1", "missing 'ivalue'"),
        ];

        for error in cases {
            assert!(error.to_string().contains("'m1'"), "{}", error);
        }
    }
}
