// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit the same event with typed fields attached.
//!
//! # Organization
//!
//! * `engine` - job lifecycle, run cycles and async run control
//! * `worker` - module construction, failures and output file boundaries
//! * `config` - configuration loading and schedule assembly warnings
//!
//! # Usage Pattern
//!
//! ```rust
//! use event_processor::observability::messages::engine::JobStarted;
//! use event_processor::observability::messages::StructuredLog;
//!
//! let msg = JobStarted {
//!     process: "TEST",
//!     module_count: 3,
//!     path_count: 1,
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod config;
pub mod engine;
pub mod worker;

/// Emit a message as a structured `tracing` event, or open a span carrying
/// the message's fields.
///
/// Only messages that mark the start of a unit of work override `span`; the
/// rest return a disabled span.
pub trait StructuredLog {
    fn log(&self);

    fn span(&self, _name: &str) -> Span {
        Span::none()
    }
}
