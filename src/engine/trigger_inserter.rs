// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::config::consts::TRIGGER_RESULTS_LABEL;
use crate::event::{Event, ProductDeclaration, TriggerResults};
use crate::traits::{Module, ModuleResult, Producer};

/// Records the event's trigger path decisions as a `TriggerResults` product.
///
/// The schedule attaches the decisions to the event after the trigger paths
/// ran; this producer turns them into a regular product that output modules
/// can keep.
pub(crate) struct TriggerResultsInserter;

impl Module for TriggerResultsInserter {}

#[async_trait]
impl Producer for TriggerResultsInserter {
    async fn produce(&mut self, event: &mut Event) -> ModuleResult {
        let results = event
            .trigger_results()
            .cloned()
            .ok_or("trigger decisions were not recorded before insertion")?;
        event.put(TRIGGER_RESULTS_LABEL, results);
        Ok(())
    }

    fn products(&self) -> Vec<ProductDeclaration> {
        vec![ProductDeclaration::new(
            TRIGGER_RESULTS_LABEL,
            std::any::type_name::<TriggerResults>(),
        )]
    }
}
