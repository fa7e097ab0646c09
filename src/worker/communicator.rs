// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{BoxError, ModuleError, Phase};
use crate::event::{LumiId, ProductDescription, ProductRegistry, RunNumber};
use crate::observability::messages::worker::ModuleHookFailed;
use crate::observability::messages::StructuredLog;
use crate::traits::{FileBlock, OutputModule, OutputModuleDescription, PathPositions};
use crate::worker::ModuleDescription;

/// File-boundary capability of an output module's worker.
///
/// Borrowed from a [`Worker`](crate::worker::Worker) for as long as the caller
/// needs it. Holds no state of its own; every call is forwarded to the module
/// and failures are annotated the same way the worker annotates its hooks.
pub struct OutputCommunicator<'a> {
    description: &'a ModuleDescription,
    module: &'a mut dyn OutputModule,
}

impl<'a> OutputCommunicator<'a> {
    pub(crate) fn new(description: &'a ModuleDescription, module: &'a mut dyn OutputModule) -> Self {
        Self {
            description,
            module,
        }
    }

    pub fn label(&self) -> &str {
        self.description.label()
    }

    pub async fn open_file(&mut self, file: &FileBlock) -> Result<(), ModuleError> {
        let outcome = self.module.open_file(file).await;
        self.annotate(Phase::OpenFile, outcome)
    }

    pub async fn close_file(&mut self) -> Result<(), ModuleError> {
        let outcome = self.module.close_file().await;
        self.annotate(Phase::CloseFile, outcome)
    }

    pub fn should_close_file(&self) -> bool {
        self.module.should_close_file()
    }

    pub async fn open_new_file_if_needed(&mut self) -> Result<(), ModuleError> {
        let outcome = self.module.open_new_file_if_needed().await;
        self.annotate(Phase::OpenNewFileIfNeeded, outcome)
    }

    pub async fn write_run(&mut self, run: RunNumber) -> Result<(), ModuleError> {
        let outcome = self.module.write_run(run).await;
        self.annotate(Phase::WriteRun, outcome)
    }

    pub async fn write_lumi(&mut self, lumi: LumiId) -> Result<(), ModuleError> {
        let outcome = self.module.write_lumi(lumi).await;
        self.annotate(Phase::WriteLumi, outcome)
    }

    pub fn want_all_events(&self) -> bool {
        self.module.want_all_events()
    }

    pub fn limit_reached(&self) -> bool {
        self.module.limit_reached()
    }

    pub fn configure(&mut self, description: &OutputModuleDescription) {
        self.module.configure(description);
    }

    pub fn selected_products(&self) -> &[ProductDescription] {
        self.module.selected_products()
    }

    pub fn select_products(&mut self, registry: &ProductRegistry) {
        self.module.select_products(registry);
    }

    pub fn set_event_selection_info(
        &mut self,
        path_positions: &PathPositions,
        any_product_produced: bool,
    ) {
        self.module
            .set_event_selection_info(path_positions, any_product_produced);
    }

    fn annotate(&self, phase: Phase, outcome: Result<(), BoxError>) -> Result<(), ModuleError> {
        outcome.map_err(|source| {
            let error = ModuleError::new(self.description, phase, source);
            ModuleHookFailed {
                label: &error.label,
                phase: phase.as_str(),
                error: error.source.as_ref(),
            }
            .log();
            error
        })
    }
}
