// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::DEFAULT_SOURCE_TYPE;
use crate::config::{ModuleConfig, SourceConfig};
use crate::errors::ConfigurationError;
use crate::traits::{ModuleKind, Source};

use super::modules::*;

/// Constructors for the built-in (in-process) modules and sources.
pub struct LocalModuleFactory;

impl LocalModuleFactory {
    /// Create a module instance from its declaration.
    ///
    /// The `type` field selects the implementation:
    /// - "IntProducer" -> IntProducer (requires `ivalue`)
    /// - "Prescaler" -> Prescaler (`prescale_factor`, `offset`)
    /// - "EventCounter" -> EventCounter (`expected_events`)
    /// - "MemoryOutput" -> MemoryOutput (`max_events_per_file`, `select_events`, `keep`)
    pub fn create_module(config: &ModuleConfig) -> Result<ModuleKind, ConfigurationError> {
        match config.type_name.as_str() {
            "IntProducer" => Ok(ModuleKind::producer(IntProducer::from_config(config)?)),
            "Prescaler" => Ok(ModuleKind::filter(Prescaler::from_config(config)?)),
            "EventCounter" => Ok(ModuleKind::analyzer(EventCounter::from_config(config)?)),
            "MemoryOutput" => Ok(ModuleKind::output(MemoryOutput::from_config(config)?)),
            _ => Err(ConfigurationError::UnknownModuleType {
                label: config.label.clone(),
                type_name: config.type_name.clone(),
            }),
        }
    }

    pub fn create_source(config: &SourceConfig) -> Result<Box<dyn Source>, ConfigurationError> {
        match config.type_name.as_str() {
            DEFAULT_SOURCE_TYPE => Ok(Box::new(EmptySource::from_config(config)?)),
            _ => Err(ConfigurationError::UnknownSourceType {
                type_name: config.type_name.clone(),
            }),
        }
    }

    /// List all built-in module types
    pub fn list_available_modules() -> Vec<&'static str> {
        vec!["IntProducer", "Prescaler", "EventCounter", "MemoryOutput"]
    }

    /// List all built-in source types
    pub fn list_available_sources() -> Vec<&'static str> {
        vec![DEFAULT_SOURCE_TYPE]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParameterSet;

    #[test]
    fn every_listed_module_can_be_built() {
        for type_name in LocalModuleFactory::list_available_modules() {
            let params = match type_name {
                "IntProducer" => ParameterSet::new().with("ivalue", 1),
                _ => ParameterSet::new(),
            };
            let config = ModuleConfig::new("m", type_name).with_params(params);
            assert!(
                LocalModuleFactory::create_module(&config).is_ok(),
                "failed to build {}",
                type_name
            );
        }
    }

    #[test]
    fn rejected_parameters_name_the_label() {
        let test_cases = vec![
            ModuleConfig::new("m1", "IntProducer"),
            ModuleConfig::new("m1", "Prescaler")
                .with_params(ParameterSet::new().with("prescale_factor", 0)),
            ModuleConfig::new("m1", "MemoryOutput")
                .with_params(ParameterSet::new().with("max_events_per_file", 0)),
        ];

        for config in test_cases {
            let error = LocalModuleFactory::create_module(&config).unwrap_err();
            assert!(
                matches!(error, ConfigurationError::InvalidParameter { ref label, .. } if label == "m1"),
                "{:?}",
                error
            );
        }
    }
}
