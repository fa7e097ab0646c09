// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::event::{EventId, TriggerResults};

/// One discrete input record flowing through the paths.
///
/// Producers attach typed products by name; later modules read them back with
/// [`Event::get`]. Products are shared (`Arc`) so output modules can keep them
/// without copying.
pub struct Event {
    id: EventId,
    products: HashMap<String, Arc<dyn Any + Send + Sync>>,
    trigger_results: Option<TriggerResults>,
}

impl Event {
    pub fn new(id: EventId) -> Self {
        Self {
            id,
            products: HashMap::new(),
            trigger_results: None,
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn put<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) {
        self.products.insert(name.into(), Arc::new(value));
    }

    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<&T> {
        self.products.get(name)?.downcast_ref::<T>()
    }

    /// Shared handle to a product, type-erased.
    pub fn get_shared(&self, name: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.products.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.products.contains_key(name)
    }

    pub fn product_names(&self) -> impl Iterator<Item = &str> {
        self.products.keys().map(String::as_str)
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Trigger decisions for this event, available once all trigger paths ran.
    pub fn trigger_results(&self) -> Option<&TriggerResults> {
        self.trigger_results.as_ref()
    }

    pub(crate) fn set_trigger_results(&mut self, results: TriggerResults) {
        self.trigger_results = Some(results);
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.id)
            .field("products", &self.products.keys().collect::<Vec<_>>())
            .field("trigger_results", &self.trigger_results)
            .finish()
    }
}
