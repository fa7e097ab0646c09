// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Log text lives in message structs rather than at call sites. Every message
//! implements `Display` and [`messages::StructuredLog`], so the same event can
//! be emitted as a plain line or with typed fields for a structured subscriber.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - job lifecycle and run control
//! * `messages::worker` - module workers and output file boundaries
//! * `messages::config` - configuration loading and schedule assembly
//!
//! # Usage
//!
//! ```rust
//! use event_processor::observability::messages::worker::ModuleHookFailed;
//!
//! let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
//! let msg = ModuleHookFailed {
//!     label: "m1",
//!     phase: "event",
//!     error: &error,
//! };
//!
//! tracing::warn!("{}", msg);
//! ```

pub mod messages;
