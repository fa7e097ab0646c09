// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::collections::BTreeMap;

/// A product a producer announces it will put into every event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDeclaration {
    pub name: String,
    pub type_name: String,
}

impl ProductDeclaration {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// A declared product together with the module that produces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDescription {
    pub name: String,
    pub type_name: String,
    pub producer_label: String,
}

/// Every product the job's producers declared, keyed by product name.
#[derive(Debug, Clone, Default)]
pub struct ProductRegistry {
    products: BTreeMap<String, ProductDescription>,
}

impl ProductRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration; a later declaration of the same name replaces the earlier one.
    pub fn register(&mut self, producer_label: &str, declaration: ProductDeclaration) {
        self.products.insert(
            declaration.name.clone(),
            ProductDescription {
                name: declaration.name,
                type_name: declaration.type_name,
                producer_label: producer_label.to_string(),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&ProductDescription> {
        self.products.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductDescription> {
        self.products.values()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
