// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Processing boundaries (run, luminosity block, event) and the per-event
//! product store.

#[allow(clippy::module_inception)]
mod event;
mod ids;
mod product;
mod trigger;

pub use event::Event;
pub use ids::{EventId, EventNumber, LumiId, LumiNumber, RunNumber};
pub use product::{ProductDeclaration, ProductDescription, ProductRegistry};
pub use trigger::{PathStatus, TriggerResults};
