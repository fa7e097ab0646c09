// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A processing-job controller: modules arranged on paths, driven over the
//! events of a source, with synchronous and asynchronous run control.

pub mod backends;   // module and source constructors
pub mod config;     // process configuration + parameter registry
pub mod engine;     // schedule, paths, event processor
pub mod errors;     // error handling
pub mod event;      // event identity, products, trigger results
pub mod observability;
pub mod services;   // activity registry
pub mod traits;     // module and source abstractions
pub mod worker;     // per-module wrappers
