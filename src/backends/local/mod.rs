// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in modules and sources.

pub mod factory;
pub mod modules;

pub use factory::LocalModuleFactory;
pub use modules::*;
