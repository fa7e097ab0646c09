// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;

use crate::errors::EngineError;
use crate::event::Event;
use crate::worker::Worker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    /// Decides whether an event passes; recorded in the trigger results.
    Trigger,
    /// Runs after the trigger decision, for every event.
    End,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PathCounters {
    pub run: u64,
    pub passed: u64,
    pub failed: u64,
    pub errored: u64,
}

/// An ordered chain of workers evaluated for each event.
///
/// A path refers to workers by their index in the schedule's worker list, so
/// one worker can appear on several paths while being owned once.
#[derive(Debug, Clone)]
pub struct Path {
    name: String,
    position: usize,
    kind: PathKind,
    workers: Vec<usize>,
    counters: PathCounters,
}

impl Path {
    pub fn new(name: &str, position: usize, kind: PathKind, workers: Vec<usize>) -> Self {
        Self {
            name: name.to_string(),
            position,
            kind,
            workers,
            counters: PathCounters::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position among paths of the same kind, in declaration order.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn kind(&self) -> PathKind {
        self.kind
    }

    pub fn worker_indices(&self) -> &[usize] {
        &self.workers
    }

    pub fn counters(&self) -> PathCounters {
        self.counters
    }

    /// Evaluate the path's workers in order.
    ///
    /// Stops at the first worker that rejects the event and returns
    /// `Ok(false)`; the workers after it are not invoked for this event.
    pub async fn process_event(
        &mut self,
        workers: &mut [Worker],
        event: &mut Event,
    ) -> Result<bool, EngineError> {
        self.counters.run += 1;

        for &index in &self.workers {
            let worker = workers
                .get_mut(index)
                .ok_or_else(|| EngineError::InternalError {
                    message: format!("path '{}' refers to missing worker #{}", self.name, index),
                })?;

            match worker.do_event(event).await {
                Ok(true) => {}
                Ok(false) => {
                    self.counters.failed += 1;
                    return Ok(false);
                }
                Err(error) => {
                    self.counters.errored += 1;
                    return Err(error);
                }
            }
        }

        self.counters.passed += 1;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{CountingAnalyzer, FailingAnalyzer, FailurePoint, RejectingFilter};
    use crate::config::ParameterSet;
    use crate::event::EventId;
    use crate::services::ActivityRegistry;
    use crate::traits::ModuleKind;
    use crate::worker::{ModuleDescription, WorkerParams};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn worker(label: &str, module: ModuleKind) -> Worker {
        let description = ModuleDescription::new(label, "Test", module.tag(), &ParameterSet::new());
        Worker::new(
            module,
            description,
            &WorkerParams {
                activity: Arc::new(ActivityRegistry::new()),
            },
        )
    }

    #[tokio::test]
    async fn rejection_short_circuits_the_path() {
        let before = CountingAnalyzer::new();
        let after = CountingAnalyzer::new();
        let (before_calls, after_calls) = (before.calls(), after.calls());
        let mut workers = vec![
            worker("before", ModuleKind::analyzer(before)),
            worker("reject", ModuleKind::filter(RejectingFilter)),
            worker("after", ModuleKind::analyzer(after)),
        ];
        let mut path = Path::new("p1", 0, PathKind::Trigger, vec![0, 1, 2]);
        let mut event = Event::new(EventId::new(1, 1, 1));

        assert!(!path.process_event(&mut workers, &mut event).await.unwrap());

        assert_eq!(before_calls.load(Ordering::Relaxed), 1);
        assert_eq!(after_calls.load(Ordering::Relaxed), 0);
        assert_eq!(path.counters().failed, 1);
    }

    #[tokio::test]
    async fn shared_worker_runs_once_per_event() {
        let shared = CountingAnalyzer::new();
        let calls = shared.calls();
        let mut workers = vec![worker("shared", ModuleKind::analyzer(shared))];
        let mut p1 = Path::new("p1", 0, PathKind::Trigger, vec![0]);
        let mut p2 = Path::new("p2", 1, PathKind::Trigger, vec![0]);

        for n in 1..=3 {
            let mut event = Event::new(EventId::new(1, 1, n));
            workers.iter_mut().for_each(Worker::reset);
            assert!(p1.process_event(&mut workers, &mut event).await.unwrap());
            assert!(p2.process_event(&mut workers, &mut event).await.unwrap());
        }

        assert_eq!(calls.load(Ordering::Relaxed), 3);
        assert_eq!(p1.counters().passed, 3);
        assert_eq!(p2.counters().passed, 3);
    }

    #[tokio::test]
    async fn module_error_aborts_the_path() {
        let mut workers = vec![worker(
            "broken",
            ModuleKind::analyzer(FailingAnalyzer::new(FailurePoint::Event)),
        )];
        let mut path = Path::new("p1", 0, PathKind::End, vec![0]);
        let mut event = Event::new(EventId::new(1, 1, 1));

        let error = path.process_event(&mut workers, &mut event).await.unwrap_err();
        assert_eq!(error.module_label(), Some("broken"));
        assert_eq!(path.counters().errored, 1);
    }
}
