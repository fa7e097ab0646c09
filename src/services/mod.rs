// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Process-scoped services handed to the event processor at construction.

mod activity;

use std::sync::Arc;

pub use activity::{Activity, ActivityError, ActivityRegistry, Signal, Subscriber};

/// The service handle an event processor is constructed with.
///
/// The caller keeps ownership of the registry; the processor only holds a
/// shared reference and fires signals into it.
#[derive(Debug, Clone, Default)]
pub struct ServiceToken {
    activity: Arc<ActivityRegistry>,
}

impl ServiceToken {
    pub fn new(activity: ActivityRegistry) -> Self {
        Self {
            activity: Arc::new(activity),
        }
    }

    pub fn activity(&self) -> &Arc<ActivityRegistry> {
        &self.activity
    }
}

impl From<Arc<ActivityRegistry>> for ServiceToken {
    fn from(activity: Arc<ActivityRegistry>) -> Self {
        Self { activity }
    }
}
