// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process publish/subscribe hub for lifecycle signals.
//!
//! Subscribers are plain closures keyed by [`Signal`]. Firing invokes them
//! synchronously on the firing task, in registration order, and stops at the
//! first subscriber that returns an error.
//!
//! # Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use event_processor::services::{Activity, ActivityRegistry, Signal};
//!
//! let registry = ActivityRegistry::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//! let counter = seen.clone();
//! registry.watch_pre_process_event(move |_id| {
//!     counter.fetch_add(1, Ordering::Relaxed);
//!     Ok(())
//! });
//!
//! registry.fire(Signal::PostBeginJob, &Activity::Job).unwrap();
//! assert_eq!(seen.load(Ordering::Relaxed), 0);
//! ```

use std::collections::HashMap;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::errors::{BoxError, SharedError};
use crate::event::{EventId, LumiId, RunNumber};
use crate::worker::ModuleDescription;

/// Lifecycle signals the engine fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    PostBeginJob,
    PostEndJob,
    PreBeginRun,
    PostEndRun,
    PreBeginLumi,
    PostEndLumi,
    PreProcessEvent,
    PostProcessEvent,
    PreModule,
    PostModule,
}

impl Signal {
    pub fn name(&self) -> &'static str {
        match self {
            Signal::PostBeginJob => "postBeginJob",
            Signal::PostEndJob => "postEndJob",
            Signal::PreBeginRun => "preBeginRun",
            Signal::PostEndRun => "postEndRun",
            Signal::PreBeginLumi => "preBeginLumi",
            Signal::PostEndLumi => "postEndLumi",
            Signal::PreProcessEvent => "preProcessEvent",
            Signal::PostProcessEvent => "postProcessEvent",
            Signal::PreModule => "preModule",
            Signal::PostModule => "postModule",
        }
    }
}

impl Display for Signal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload handed to subscribers.
#[derive(Debug, Clone, Copy)]
pub enum Activity<'a> {
    Job,
    Run(RunNumber),
    Lumi(LumiId),
    Event(EventId),
    Module(&'a ModuleDescription),
}

pub type Subscriber = Arc<dyn Fn(&Activity<'_>) -> Result<(), BoxError> + Send + Sync>;

/// A subscriber failed while a signal was being fired.
#[derive(Debug, Clone)]
pub struct ActivityError {
    pub signal: Signal,
    /// Registration position of the failing subscriber.
    pub index: usize,
    pub source: SharedError,
}

impl Display for ActivityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Subscriber #{} to signal '{}' failed: {}",
            self.index, self.signal, self.source
        )
    }
}

impl Error for ActivityError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Signal name -> ordered subscriber list.
///
/// The lock lets a shared registry be populated through `&self`; it is never
/// held while a callback runs.
#[derive(Default)]
pub struct ActivityRegistry {
    subscribers: RwLock<HashMap<Signal, Vec<Subscriber>>>,
}

impl ActivityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `callback` to the subscribers of `signal`.
    ///
    /// Safe to call from inside a callback; the new subscriber is first
    /// invoked by the next [`fire`](Self::fire).
    pub fn subscribe<F>(&self, signal: Signal, callback: F)
    where
        F: Fn(&Activity<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.write()
            .entry(signal)
            .or_default()
            .push(Arc::new(callback));
    }

    /// Invoke every subscriber of `signal` in registration order.
    ///
    /// Callbacks run on a snapshot of the subscriber list, with the registry
    /// unlocked.
    pub fn fire(&self, signal: Signal, activity: &Activity<'_>) -> Result<(), ActivityError> {
        let callbacks: Vec<Subscriber> = match self.read().get(&signal) {
            Some(callbacks) => callbacks.clone(),
            None => return Ok(()),
        };

        for (index, callback) in callbacks.iter().enumerate() {
            callback(activity).map_err(|source| ActivityError {
                signal,
                index,
                source: Arc::from(source),
            })?;
        }
        Ok(())
    }

    pub fn subscriber_count(&self, signal: Signal) -> usize {
        self.read().get(&signal).map_or(0, Vec::len)
    }

    pub fn watch_post_begin_job<F>(&self, callback: F)
    where
        F: Fn() -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.subscribe(Signal::PostBeginJob, move |_| callback());
    }

    pub fn watch_post_end_job<F>(&self, callback: F)
    where
        F: Fn() -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.subscribe(Signal::PostEndJob, move |_| callback());
    }

    pub fn watch_pre_begin_run<F>(&self, callback: F)
    where
        F: Fn(RunNumber) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.subscribe(Signal::PreBeginRun, move |activity| match activity {
            Activity::Run(run) => callback(*run),
            _ => Ok(()),
        });
    }

    pub fn watch_post_end_run<F>(&self, callback: F)
    where
        F: Fn(RunNumber) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.subscribe(Signal::PostEndRun, move |activity| match activity {
            Activity::Run(run) => callback(*run),
            _ => Ok(()),
        });
    }

    pub fn watch_pre_begin_lumi<F>(&self, callback: F)
    where
        F: Fn(LumiId) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.subscribe(Signal::PreBeginLumi, move |activity| match activity {
            Activity::Lumi(lumi) => callback(*lumi),
            _ => Ok(()),
        });
    }

    pub fn watch_post_end_lumi<F>(&self, callback: F)
    where
        F: Fn(LumiId) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.subscribe(Signal::PostEndLumi, move |activity| match activity {
            Activity::Lumi(lumi) => callback(*lumi),
            _ => Ok(()),
        });
    }

    pub fn watch_pre_process_event<F>(&self, callback: F)
    where
        F: Fn(EventId) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.subscribe(Signal::PreProcessEvent, move |activity| match activity {
            Activity::Event(id) => callback(*id),
            _ => Ok(()),
        });
    }

    pub fn watch_post_process_event<F>(&self, callback: F)
    where
        F: Fn(EventId) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.subscribe(Signal::PostProcessEvent, move |activity| match activity {
            Activity::Event(id) => callback(*id),
            _ => Ok(()),
        });
    }

    pub fn watch_pre_module<F>(&self, callback: F)
    where
        F: Fn(&ModuleDescription) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.subscribe(Signal::PreModule, move |activity| match activity {
            Activity::Module(description) => callback(description),
            _ => Ok(()),
        });
    }

    pub fn watch_post_module<F>(&self, callback: F)
    where
        F: Fn(&ModuleDescription) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.subscribe(Signal::PostModule, move |activity| match activity {
            Activity::Module(description) => callback(description),
            _ => Ok(()),
        });
    }

    // A panicking subscriber poisons the lock; the map itself is still intact.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<Signal, Vec<Subscriber>>> {
        self.subscribers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Signal, Vec<Subscriber>>> {
        self.subscribers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for ActivityRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&'static str, usize> = self
            .read()
            .iter()
            .map(|(signal, callbacks)| (signal.name(), callbacks.len()))
            .collect();
        f.debug_struct("ActivityRegistry")
            .field("subscribers", &counts)
            .finish()
    }
}
