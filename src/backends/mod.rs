// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Module and source implementations, and the factory that builds them.
//!
//! # Available Backends
//!
//! ## Local Backend
//! In-process modules and sources shipped with the crate:
//! - **EmptySource**: generates empty events for a run, lumi size and count
//! - **IntProducer**: puts a configured integer into every event
//! - **Prescaler**: accepts one event in N
//! - **EventCounter**: counts events, runs and lumis
//! - **MemoryOutput**: writes selected events into in-memory files
//!
//! ## Stub Backend (Test-Only)
//! Modules for exercising workers and the event processor (only available in
//! test builds):
//! - **BeginEndJobAnalyzer**: records every lifecycle hook and its own drop
//! - **FailingAnalyzer**: fails at a chosen lifecycle point
//! - **RejectingFilter**, **CountingAnalyzer**, **RecordingOutput**
//!
//! # Architecture
//!
//! ```text
//! Configuration → ModuleFactory → ModuleKind → Worker → Path
//! ```
//!
//! # Examples
//!
//! ```rust
//! use event_processor::backends::ModuleFactory;
//! use event_processor::config::SourceConfig;
//!
//! let factory = ModuleFactory::with_builtins();
//! let mut source = factory.create_source(&SourceConfig::default())?;
//! assert!(source.next_event()?.is_some());
//! # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
//! ```

pub mod factory;
pub mod local;
#[cfg(test)]
pub mod stub;

pub use factory::{ModuleConstructor, ModuleFactory, SourceConstructor};
