// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Label of the implicit module recording trigger path decisions
pub const TRIGGER_RESULTS_LABEL: &str = "TriggerResults";
/// Type name of the implicit trigger results module
pub const TRIGGER_RESULTS_TYPE: &str = "TriggerResultsInserter";
/// Run number used by sources when none is configured or set
pub const DEFAULT_FIRST_RUN: u32 = 1;
/// First luminosity block number of every run
pub const DEFAULT_FIRST_LUMI: u32 = 1;
/// Source type used when a configuration names none
pub const DEFAULT_SOURCE_TYPE: &str = "EmptySource";
/// Output module parameter naming the trigger paths that select events
pub const SELECT_EVENTS_PARAM: &str = "select_events";
