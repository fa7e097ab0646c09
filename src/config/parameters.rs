// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt::{Display, Formatter};

use crate::errors::ConfigurationError;

/// Stable fingerprint of a [`ParameterSet`]'s contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ParameterSetId(String);

impl ParameterSetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ParameterSetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A module's resolved configuration values.
///
/// Keys are kept sorted, so two sets with the same contents render to the same
/// canonical JSON and therefore share a [`ParameterSetId`].
///
/// # Example
/// ```
/// use event_processor::config::ParameterSet;
///
/// let params = ParameterSet::new().with("ivalue", 10);
/// assert_eq!(params.require_i64("m1", "ivalue").unwrap(), 10);
/// assert!(params.require_i64("m1", "missing").unwrap_err().to_string().contains("m1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet(Map<String, Value>);

impl ParameterSet {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical (sorted-key) JSON rendering.
    pub fn canonical(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    pub fn id(&self) -> ParameterSetId {
        let digest = Sha256::digest(self.canonical().as_bytes());
        ParameterSetId(URL_SAFE_NO_PAD.encode(digest))
    }

    pub fn require_i64(&self, label: &str, key: &str) -> Result<i64, ConfigurationError> {
        self.optional_i64(label, key)?
            .ok_or_else(|| ConfigurationError::invalid(label, format!("missing required parameter '{}'", key)))
    }

    pub fn optional_i64(&self, label: &str, key: &str) -> Result<Option<i64>, ConfigurationError> {
        match self.0.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| mismatch(label, key, "an integer", value)),
        }
    }

    pub fn optional_u64(&self, label: &str, key: &str) -> Result<Option<u64>, ConfigurationError> {
        match self.0.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .map(Some)
                .ok_or_else(|| mismatch(label, key, "a non-negative integer", value)),
        }
    }

    pub fn optional_bool(&self, label: &str, key: &str) -> Result<Option<bool>, ConfigurationError> {
        match self.0.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_bool()
                .map(Some)
                .ok_or_else(|| mismatch(label, key, "a boolean", value)),
        }
    }

    /// A list of strings; absent means empty.
    pub fn optional_strings(&self, label: &str, key: &str) -> Result<Vec<String>, ConfigurationError> {
        match self.0.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| mismatch(label, key, "a list of strings", item))
                })
                .collect(),
            Some(value) => Err(mismatch(label, key, "a list of strings", value)),
        }
    }
}

fn mismatch(label: &str, key: &str, expected: &str, found: &Value) -> ConfigurationError {
    ConfigurationError::invalid(
        label,
        format!("parameter '{}' must be {}, found {}", key, expected, found),
    )
}
