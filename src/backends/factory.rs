// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;

use crate::backends::local::LocalModuleFactory;
use crate::config::{ModuleConfig, SourceConfig};
use crate::errors::ConfigurationError;
use crate::traits::{ModuleKind, Source};

pub type ModuleConstructor =
    Box<dyn Fn(&ModuleConfig) -> Result<ModuleKind, ConfigurationError> + Send + Sync>;

pub type SourceConstructor =
    Box<dyn Fn(&SourceConfig) -> Result<Box<dyn Source>, ConfigurationError> + Send + Sync>;

/// Type name -> constructor table for modules and sources.
///
/// This is an explicit in-process table: a job can only use types that were
/// registered before the event processor is built.
///
/// # Example
/// ```rust
/// use event_processor::backends::ModuleFactory;
/// use event_processor::config::{ModuleConfig, ParameterSet};
///
/// let factory = ModuleFactory::with_builtins();
/// let config = ModuleConfig::new("m1", "IntProducer")
///     .with_params(ParameterSet::new().with("ivalue", 10));
/// assert!(factory.create_module(&config).is_ok());
/// ```
#[derive(Default)]
pub struct ModuleFactory {
    modules: HashMap<String, ModuleConstructor>,
    sources: HashMap<String, SourceConstructor>,
}

impl ModuleFactory {
    /// An empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory with every built-in module and source registered.
    pub fn with_builtins() -> Self {
        let mut factory = Self::new();
        for type_name in LocalModuleFactory::list_available_modules() {
            factory.register_module(type_name, LocalModuleFactory::create_module);
        }
        for type_name in LocalModuleFactory::list_available_sources() {
            factory.register_source(type_name, LocalModuleFactory::create_source);
        }
        factory
    }

    /// Register (or replace) the constructor for a module type.
    pub fn register_module<F>(&mut self, type_name: &str, constructor: F)
    where
        F: Fn(&ModuleConfig) -> Result<ModuleKind, ConfigurationError> + Send + Sync + 'static,
    {
        self.modules
            .insert(type_name.to_string(), Box::new(constructor));
    }

    /// Register (or replace) the constructor for a source type.
    pub fn register_source<F>(&mut self, type_name: &str, constructor: F)
    where
        F: Fn(&SourceConfig) -> Result<Box<dyn Source>, ConfigurationError>
            + Send
            + Sync
            + 'static,
    {
        self.sources
            .insert(type_name.to_string(), Box::new(constructor));
    }

    pub fn create_module(&self, config: &ModuleConfig) -> Result<ModuleKind, ConfigurationError> {
        let constructor = self.modules.get(&config.type_name).ok_or_else(|| {
            ConfigurationError::UnknownModuleType {
                label: config.label.clone(),
                type_name: config.type_name.clone(),
            }
        })?;
        constructor(config)
    }

    pub fn create_source(&self, config: &SourceConfig) -> Result<Box<dyn Source>, ConfigurationError> {
        let constructor = self.sources.get(&config.type_name).ok_or_else(|| {
            ConfigurationError::UnknownSourceType {
                type_name: config.type_name.clone(),
            }
        })?;
        constructor(config)
    }

    /// Registered module type names, sorted.
    pub fn module_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_module_type_available(&self, type_name: &str) -> bool {
        self.modules.contains_key(type_name)
    }
}

impl fmt::Debug for ModuleFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sources: Vec<&str> = self.sources.keys().map(String::as_str).collect();
        sources.sort_unstable();
        f.debug_struct("ModuleFactory")
            .field("modules", &self.module_types())
            .field("sources", &sources)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParameterSet;
    use crate::traits::ModuleTag;

    #[test]
    fn builtins_are_registered() {
        let factory = ModuleFactory::with_builtins();
        for name in ["IntProducer", "Prescaler", "EventCounter", "MemoryOutput"] {
            assert!(factory.is_module_type_available(name), "{}", name);
        }
        assert!(factory.create_source(&SourceConfig::default()).is_ok());
    }

    #[test]
    fn builds_each_kind() {
        let factory = ModuleFactory::with_builtins();
        let test_cases = vec![
            (
                ModuleConfig::new("m1", "IntProducer")
                    .with_params(ParameterSet::new().with("ivalue", 10)),
                ModuleTag::Producer,
            ),
            (
                ModuleConfig::new("f1", "Prescaler")
                    .with_params(ParameterSet::new().with("prescale_factor", 2)),
                ModuleTag::Filter,
            ),
            (ModuleConfig::new("a1", "EventCounter"), ModuleTag::Analyzer),
            (ModuleConfig::new("out", "MemoryOutput"), ModuleTag::OutputModule),
        ];

        for (config, expected) in test_cases {
            let module = factory.create_module(&config).unwrap();
            assert_eq!(module.tag(), expected, "module: {}", config.label);
        }
    }

    #[test]
    fn unknown_types_name_the_label() {
        let factory = ModuleFactory::with_builtins();
        let error = factory
            .create_module(&ModuleConfig::new("mystery", "NoSuchModule"))
            .unwrap_err();
        assert!(error.to_string().contains("mystery"));
        assert!(error.to_string().contains("NoSuchModule"));

        let error = factory
            .create_source(&SourceConfig::new("NoSuchSource", ParameterSet::new()))
            .err()
            .unwrap();
        assert!(error.to_string().contains("NoSuchSource"));
    }

    #[test]
    fn registered_constructors_override_builtins() {
        let mut factory = ModuleFactory::with_builtins();
        factory.register_module("IntProducer", |config| {
            Err(ConfigurationError::invalid(&config.label, "disabled"))
        });

        let error = factory
            .create_module(&ModuleConfig::new("m1", "IntProducer"))
            .unwrap_err();
        assert_eq!(error, ConfigurationError::invalid("m1", "disabled"));
    }
}
