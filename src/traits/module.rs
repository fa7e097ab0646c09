// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use crate::errors::BoxError;
use crate::event::{
    Event, LumiId, ProductDeclaration, ProductDescription, ProductRegistry, RunNumber,
};

pub type ModuleResult<T = ()> = Result<T, BoxError>;

/// Lifecycle hooks shared by every module kind. All default to no-ops.
///
/// Cleanup belongs in `Drop`: the owning worker drops its module exactly once
/// when the job is torn down, whether or not `end_job` ever ran.
#[async_trait]
pub trait Module: Send {
    async fn begin_job(&mut self) -> ModuleResult {
        Ok(())
    }

    async fn end_job(&mut self) -> ModuleResult {
        Ok(())
    }

    async fn begin_run(&mut self, _run: RunNumber) -> ModuleResult {
        Ok(())
    }

    async fn end_run(&mut self, _run: RunNumber) -> ModuleResult {
        Ok(())
    }

    async fn begin_lumi(&mut self, _lumi: LumiId) -> ModuleResult {
        Ok(())
    }

    async fn end_lumi(&mut self, _lumi: LumiId) -> ModuleResult {
        Ok(())
    }
}

/// Adds data products to each event.
#[async_trait]
pub trait Producer: Module {
    async fn produce(&mut self, event: &mut Event) -> ModuleResult;

    /// Products this module puts into every event.
    fn products(&self) -> Vec<ProductDeclaration> {
        Vec::new()
    }
}

/// Decides whether the rest of a path runs for an event.
#[async_trait]
pub trait Filter: Module {
    async fn filter(&mut self, event: &mut Event) -> ModuleResult<bool>;
}

/// Reads events without modifying them.
#[async_trait]
pub trait Analyzer: Module {
    async fn analyze(&mut self, event: &Event) -> ModuleResult;
}

/// Where an output module's file came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlock {
    pub source_label: String,
    pub process_name: String,
}

/// Job-level settings handed to output modules before the first event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputModuleDescription {
    /// Maximum number of events each output module should write.
    pub max_events: Option<u64>,
}

/// Output module label -> (trigger path name, trigger path position).
pub type PathPositions = BTreeMap<String, Vec<(String, usize)>>;

/// Persists selected events and manages its own output files.
///
/// The file-boundary operations are reached through an
/// [`OutputCommunicator`](crate::worker::OutputCommunicator), never through the
/// generic worker interface.
#[async_trait]
pub trait OutputModule: Module {
    /// Persist one event. The module applies its own event selection.
    async fn write(&mut self, event: &Event) -> ModuleResult;

    async fn open_file(&mut self, file: &FileBlock) -> ModuleResult;

    async fn close_file(&mut self) -> ModuleResult;

    /// Called after `close_file` when the module asked for rotation; the
    /// module decides whether a new file is actually opened.
    async fn open_new_file_if_needed(&mut self) -> ModuleResult {
        Ok(())
    }

    async fn write_run(&mut self, run: RunNumber) -> ModuleResult;

    async fn write_lumi(&mut self, lumi: LumiId) -> ModuleResult;

    /// True when the current file reached a size or event limit.
    fn should_close_file(&self) -> bool {
        false
    }

    /// True when no event filtering is applied.
    fn want_all_events(&self) -> bool {
        true
    }

    /// True once the module has written as many events as it was configured for.
    fn limit_reached(&self) -> bool {
        false
    }

    fn configure(&mut self, _description: &OutputModuleDescription) {}

    fn selected_products(&self) -> &[ProductDescription];

    fn select_products(&mut self, registry: &ProductRegistry);

    fn set_event_selection_info(
        &mut self,
        _path_positions: &PathPositions,
        _any_product_produced: bool,
    ) {
    }
}

/// The closed set of module kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleTag {
    Producer,
    Filter,
    Analyzer,
    OutputModule,
}

impl Display for ModuleTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ModuleTag::Producer => "producer",
            ModuleTag::Filter => "filter",
            ModuleTag::Analyzer => "analyzer",
            ModuleTag::OutputModule => "output module",
        };
        f.write_str(name)
    }
}

/// A module instance tagged with its kind; the worker dispatches on the tag.
pub enum ModuleKind {
    Producer(Box<dyn Producer>),
    Filter(Box<dyn Filter>),
    Analyzer(Box<dyn Analyzer>),
    Output(Box<dyn OutputModule>),
}

impl ModuleKind {
    pub fn producer(module: impl Producer + 'static) -> Self {
        ModuleKind::Producer(Box::new(module))
    }

    pub fn filter(module: impl Filter + 'static) -> Self {
        ModuleKind::Filter(Box::new(module))
    }

    pub fn analyzer(module: impl Analyzer + 'static) -> Self {
        ModuleKind::Analyzer(Box::new(module))
    }

    pub fn output(module: impl OutputModule + 'static) -> Self {
        ModuleKind::Output(Box::new(module))
    }

    pub fn tag(&self) -> ModuleTag {
        match self {
            ModuleKind::Producer(_) => ModuleTag::Producer,
            ModuleKind::Filter(_) => ModuleTag::Filter,
            ModuleKind::Analyzer(_) => ModuleTag::Analyzer,
            ModuleKind::Output(_) => ModuleTag::OutputModule,
        }
    }
}

impl std::fmt::Debug for ModuleKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ModuleKind").field(&self.tag()).finish()
    }
}
