// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::BoxError;
use crate::event::{EventId, RunNumber};

/// Supplies event identifiers, one at a time, to the event processor.
///
/// Run and luminosity block boundaries are implied by changes in the returned
/// ids. `Ok(None)` means the input is exhausted.
pub trait Source: Send {
    fn label(&self) -> &str;

    fn next_event(&mut self) -> Result<Option<EventId>, BoxError>;

    /// Run number to use for events generated from now on.
    fn set_run_number(&mut self, run: RunNumber);

    /// Restart from the first event.
    fn rewind(&mut self);
}
