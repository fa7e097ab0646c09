// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Result of a run cycle or of a wait on an asynchronous run.
///
/// `TimedOut` is not a failure: the background run may still be going and
/// the wait can be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatusCode {
    /// The cycle stopped on an event limit or a stop request.
    Success,
    /// The source ran out of events.
    InputExhausted,
    /// The wait's budget elapsed before the run finished.
    TimedOut,
}

impl StatusCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCode::Success => "Success",
            StatusCode::InputExhausted => "InputExhausted",
            StatusCode::TimedOut => "TimedOut",
        }
    }
}

impl Display for StatusCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable state of the asynchronous run controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RunState {
    /// No asynchronous run has been started.
    Idle,
    Running,
    /// A stop was requested and the run has not finished yet.
    StopRequested,
    /// The last asynchronous run finished without error.
    Done,
    /// The last asynchronous run ended with an error.
    Failed,
}
