// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod module;
pub mod source;

pub use module::{
    Analyzer, FileBlock, Filter, Module, ModuleKind, ModuleResult, ModuleTag, OutputModule,
    OutputModuleDescription, PathPositions, Producer,
};
pub use source::Source;
