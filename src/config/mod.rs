// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod context;
mod loader;
mod parameters;
mod validation;

pub mod consts;

pub use context::ProcessContext;
pub use loader::{
    load_and_validate_config, load_config, ModuleConfig, PathConfig, ProcessConfig, SourceConfig,
};
pub use parameters::{ParameterSet, ParameterSetId};
pub use validation::validate_process_config;
