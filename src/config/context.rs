// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::config::{ParameterSet, ParameterSetId};

/// Process-scoped registry of every parameter set the job was built from.
///
/// Created when an event processor is constructed and dropped with it; nothing
/// about it is global. Populated before it is shared, read-only afterwards.
#[derive(Debug, Default)]
pub struct ProcessContext {
    process_name: String,
    parameter_sets: HashMap<ParameterSetId, ParameterSet>,
}

impl ProcessContext {
    pub fn new(process_name: impl Into<String>) -> Self {
        Self {
            process_name: process_name.into(),
            parameter_sets: HashMap::new(),
        }
    }

    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    /// Store a parameter set, returning its fingerprint. Identical sets are stored once.
    pub fn register(&mut self, parameters: &ParameterSet) -> ParameterSetId {
        let id = parameters.id();
        self.parameter_sets
            .entry(id.clone())
            .or_insert_with(|| parameters.clone());
        id
    }

    pub fn parameter_set(&self, id: &ParameterSetId) -> Option<&ParameterSet> {
        self.parameter_sets.get(id)
    }

    pub fn len(&self) -> usize {
        self.parameter_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameter_sets.is_empty()
    }
}
