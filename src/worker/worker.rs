// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::sync::Arc;
use tracing::{Instrument, Span};

use crate::errors::{BoxError, EngineError, ModuleError, Phase};
use crate::event::{Event, LumiId, ProductDeclaration, RunNumber};
use crate::observability::messages::worker::{ModuleConstructed, ModuleHookFailed, ModuleHookStarted};
use crate::observability::messages::StructuredLog;
use crate::services::{Activity, ActivityRegistry, Signal};
use crate::traits::{Module, ModuleKind, ModuleResult, ModuleTag};
use crate::worker::{ModuleDescription, OutputCommunicator};

/// Job-wide parameters every worker is constructed with.
#[derive(Debug, Clone)]
pub struct WorkerParams {
    pub activity: Arc<ActivityRegistry>,
}

/// Per-event outcome cached by a worker until the next [`Worker::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Ready,
    Pass,
    Fail,
    Exception,
}

/// How often a worker's event hook ran and what it decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerCounters {
    pub run: u64,
    pub passed: u64,
    pub failed: u64,
    pub errored: u64,
}

#[derive(Debug, Clone, Copy)]
enum Transition {
    BeginJob,
    EndJob,
    BeginRun(RunNumber),
    EndRun(RunNumber),
    BeginLumi(LumiId),
    EndLumi(LumiId),
}

impl Transition {
    fn phase(&self) -> Phase {
        match self {
            Transition::BeginJob => Phase::BeginJob,
            Transition::EndJob => Phase::EndJob,
            Transition::BeginRun(_) => Phase::BeginRun,
            Transition::EndRun(_) => Phase::EndRun,
            Transition::BeginLumi(_) => Phase::BeginLumi,
            Transition::EndLumi(_) => Phase::EndLumi,
        }
    }
}

async fn call_transition<M: Module + ?Sized>(module: &mut M, transition: Transition) -> ModuleResult {
    match transition {
        Transition::BeginJob => module.begin_job().await,
        Transition::EndJob => module.end_job().await,
        Transition::BeginRun(run) => module.begin_run(run).await,
        Transition::EndRun(run) => module.end_run(run).await,
        Transition::BeginLumi(lumi) => module.begin_lumi(lumi).await,
        Transition::EndLumi(lumi) => module.end_lumi(lumi).await,
    }
}

/// Uniform lifecycle wrapper around one module instance.
///
/// The worker owns its module exclusively. Every hook it forwards is wrapped
/// so a module's error comes back as a [`ModuleError`] naming the module and
/// the phase. The event hook runs at most once per event no matter how many
/// paths reach the worker: the first call decides, later calls see the cached
/// decision until [`reset`](Self::reset). Run and lumi hooks are guarded the
/// same way so each boundary fires the hook once.
pub struct Worker {
    description: ModuleDescription,
    module: ModuleKind,
    activity: Arc<ActivityRegistry>,
    state: WorkerState,
    cached_error: Option<EngineError>,
    open_run: Option<RunNumber>,
    open_lumi: Option<LumiId>,
    counters: WorkerCounters,
}

impl Worker {
    pub fn new(module: ModuleKind, description: ModuleDescription, params: &WorkerParams) -> Self {
        ModuleConstructed {
            label: description.label(),
            type_name: description.type_name(),
            kind: &description.kind().to_string(),
        }
        .log();

        Self {
            description,
            module,
            activity: params.activity.clone(),
            state: WorkerState::Ready,
            cached_error: None,
            open_run: None,
            open_lumi: None,
            counters: WorkerCounters::default(),
        }
    }

    pub fn description(&self) -> &ModuleDescription {
        &self.description
    }

    pub fn label(&self) -> &str {
        self.description.label()
    }

    pub fn kind(&self) -> ModuleTag {
        self.module.tag()
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn counters(&self) -> WorkerCounters {
        self.counters
    }

    /// Products this worker's module declares, empty for non-producers.
    pub fn products(&self) -> Vec<ProductDeclaration> {
        match &self.module {
            ModuleKind::Producer(module) => module.products(),
            _ => Vec::new(),
        }
    }

    /// The output capability of this worker, or `None` when the module is
    /// not an output module.
    pub fn communicator(&mut self) -> Option<OutputCommunicator<'_>> {
        match &mut self.module {
            ModuleKind::Output(module) => {
                Some(OutputCommunicator::new(&self.description, module.as_mut()))
            }
            _ => None,
        }
    }

    pub async fn begin_job(&mut self) -> Result<(), EngineError> {
        self.transition(Transition::BeginJob).await
    }

    pub async fn end_job(&mut self) -> Result<(), EngineError> {
        self.transition(Transition::EndJob).await
    }

    pub async fn begin_run(&mut self, run: RunNumber) -> Result<(), EngineError> {
        if self.open_run == Some(run) {
            return Ok(());
        }
        self.open_run = Some(run);
        self.transition(Transition::BeginRun(run)).await
    }

    pub async fn end_run(&mut self, run: RunNumber) -> Result<(), EngineError> {
        if self.open_run != Some(run) {
            return Ok(());
        }
        self.open_run = None;
        self.transition(Transition::EndRun(run)).await
    }

    pub async fn begin_lumi(&mut self, lumi: LumiId) -> Result<(), EngineError> {
        if self.open_lumi == Some(lumi) {
            return Ok(());
        }
        self.open_lumi = Some(lumi);
        self.transition(Transition::BeginLumi(lumi)).await
    }

    pub async fn end_lumi(&mut self, lumi: LumiId) -> Result<(), EngineError> {
        if self.open_lumi != Some(lumi) {
            return Ok(());
        }
        self.open_lumi = None;
        self.transition(Transition::EndLumi(lumi)).await
    }

    /// Clear the cached per-event decision ahead of the next event.
    pub fn reset(&mut self) {
        self.state = WorkerState::Ready;
        self.cached_error = None;
    }

    /// Run the module's event hook, or return the decision already made for
    /// this event.
    ///
    /// Returns `Ok(false)` only for a filter that rejected the event. The
    /// module signals fire around the hook whether or not it succeeds.
    pub async fn do_event(&mut self, event: &mut Event) -> Result<bool, EngineError> {
        match self.state {
            WorkerState::Pass => return Ok(true),
            WorkerState::Fail => return Ok(false),
            WorkerState::Exception => {
                return Err(self.cached_error.clone().unwrap_or_else(|| {
                    EngineError::InternalError {
                        message: format!("worker '{}' lost its cached error", self.label()),
                    }
                }))
            }
            WorkerState::Ready => {}
        }

        self.counters.run += 1;
        let outcome = self.invoke_event(event).await;

        match outcome {
            Ok(true) => {
                self.state = WorkerState::Pass;
                self.counters.passed += 1;
                Ok(true)
            }
            Ok(false) => {
                self.state = WorkerState::Fail;
                self.counters.failed += 1;
                Ok(false)
            }
            Err(error) => {
                self.state = WorkerState::Exception;
                self.counters.errored += 1;
                self.cached_error = Some(error.clone());
                Err(error)
            }
        }
    }

    async fn invoke_event(&mut self, event: &mut Event) -> Result<bool, EngineError> {
        self.activity
            .fire(Signal::PreModule, &Activity::Module(&self.description))?;

        let span = self.hook_span(Phase::Event);
        let module = &mut self.module;
        let outcome = async move {
            match module {
                ModuleKind::Producer(module) => module.produce(event).await.map(|_| true),
                ModuleKind::Filter(module) => module.filter(event).await,
                ModuleKind::Analyzer(module) => module.analyze(event).await.map(|_| true),
                ModuleKind::Output(module) => module.write(event).await.map(|_| true),
            }
        }
        .instrument(span)
        .await;

        let post = self
            .activity
            .fire(Signal::PostModule, &Activity::Module(&self.description));

        let accepted = outcome.map_err(|source| self.annotate(Phase::Event, source))?;
        post?;
        Ok(accepted)
    }

    async fn transition(&mut self, transition: Transition) -> Result<(), EngineError> {
        let span = self.hook_span(transition.phase());
        let module = &mut self.module;
        let outcome = async move {
            match module {
                ModuleKind::Producer(module) => call_transition(module.as_mut(), transition).await,
                ModuleKind::Filter(module) => call_transition(module.as_mut(), transition).await,
                ModuleKind::Analyzer(module) => call_transition(module.as_mut(), transition).await,
                ModuleKind::Output(module) => call_transition(module.as_mut(), transition).await,
            }
        }
        .instrument(span)
        .await;
        outcome.map_err(|source| self.annotate(transition.phase(), source).into())
    }

    fn hook_span(&self, phase: Phase) -> Span {
        let msg = ModuleHookStarted {
            label: self.label(),
            phase: phase.as_str(),
        };
        let span = msg.span("hook");
        span.in_scope(|| msg.log());
        span
    }

    fn annotate(&self, phase: Phase, source: BoxError) -> ModuleError {
        let error = ModuleError::new(&self.description, phase, source);
        ModuleHookFailed {
            label: &error.label,
            phase: phase.as_str(),
            error: error.source.as_ref(),
        }
        .log();
        error
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("description", &self.description)
            .field("state", &self.state)
            .field("counters", &self.counters)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{
        CountingAnalyzer, FailingAnalyzer, FailurePoint, RecordingOutput, RejectingFilter,
    };
    use crate::config::ParameterSet;
    use crate::event::EventId;
    use crate::traits::FileBlock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn worker(label: &str, module: ModuleKind, activity: Arc<ActivityRegistry>) -> Worker {
        let description = ModuleDescription::new(label, "Test", module.tag(), &ParameterSet::new());
        Worker::new(module, description, &WorkerParams { activity })
    }

    #[tokio::test]
    async fn event_hook_runs_once_per_event() {
        let counter = CountingAnalyzer::new();
        let calls = counter.calls();
        let mut w = worker("a1", ModuleKind::analyzer(counter), Arc::default());
        let mut event = Event::new(EventId::new(1, 1, 1));

        assert!(w.do_event(&mut event).await.unwrap());
        assert!(w.do_event(&mut event).await.unwrap());
        assert_eq!(calls.load(Ordering::Relaxed), 1);

        w.reset();
        assert!(w.do_event(&mut event).await.unwrap());
        assert_eq!(calls.load(Ordering::Relaxed), 2);
        assert_eq!(w.counters().run, 2);
    }

    #[tokio::test]
    async fn filter_rejection_is_cached() {
        let mut w = worker("f1", ModuleKind::filter(RejectingFilter), Arc::default());
        let mut event = Event::new(EventId::new(1, 1, 1));

        assert!(!w.do_event(&mut event).await.unwrap());
        assert_eq!(w.state(), WorkerState::Fail);
        assert!(!w.do_event(&mut event).await.unwrap());
        assert_eq!(w.counters().failed, 1);
    }

    #[tokio::test]
    async fn errors_name_the_module_and_phase() {
        struct TestCase {
            name: &'static str,
            point: FailurePoint,
            phase: Phase,
        }

        let test_cases = vec![
            TestCase {
                name: "begin job",
                point: FailurePoint::BeginJob,
                phase: Phase::BeginJob,
            },
            TestCase {
                name: "event",
                point: FailurePoint::Event,
                phase: Phase::Event,
            },
            TestCase {
                name: "end job",
                point: FailurePoint::EndJob,
                phase: Phase::EndJob,
            },
        ];

        for case in test_cases {
            let mut w = worker(
                "broken",
                ModuleKind::analyzer(FailingAnalyzer::new(case.point)),
                Arc::default(),
            );
            let mut event = Event::new(EventId::new(1, 1, 1));

            let error = match case.point {
                FailurePoint::BeginJob => w.begin_job().await.unwrap_err(),
                FailurePoint::Event => w.do_event(&mut event).await.unwrap_err(),
                FailurePoint::EndJob => w.end_job().await.unwrap_err(),
            };

            match &error {
                EngineError::Module(e) => {
                    assert_eq!(e.label, "broken", "case: {}", case.name);
                    assert_eq!(e.phase, case.phase, "case: {}", case.name);
                }
                other => panic!("case {}: unexpected error {other:?}", case.name),
            }
            assert!(error.to_string().contains("broken"), "case: {}", case.name);
        }
    }

    #[tokio::test]
    async fn cached_error_is_returned_to_later_paths() {
        let mut w = worker(
            "broken",
            ModuleKind::analyzer(FailingAnalyzer::new(FailurePoint::Event)),
            Arc::default(),
        );
        let mut event = Event::new(EventId::new(1, 1, 1));

        let first = w.do_event(&mut event).await.unwrap_err();
        let second = w.do_event(&mut event).await.unwrap_err();
        assert_eq!(first.to_string(), second.to_string());
        assert_eq!(w.counters().errored, 1);
    }

    #[tokio::test]
    async fn module_signals_fire_even_when_the_module_fails() {
        let activity = Arc::new(ActivityRegistry::new());
        let pre = Arc::new(AtomicUsize::new(0));
        let post = Arc::new(AtomicUsize::new(0));
        let p = pre.clone();
        activity.watch_pre_module(move |_| {
            p.fetch_add(1, Ordering::Relaxed);
            Ok(())
        });
        let p = post.clone();
        activity.watch_post_module(move |_| {
            p.fetch_add(1, Ordering::Relaxed);
            Ok(())
        });

        let mut w = worker(
            "broken",
            ModuleKind::analyzer(FailingAnalyzer::new(FailurePoint::Event)),
            activity,
        );
        let mut event = Event::new(EventId::new(1, 1, 1));
        assert!(w.do_event(&mut event).await.is_err());

        assert_eq!(pre.load(Ordering::Relaxed), 1);
        assert_eq!(post.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn boundary_hooks_fire_once_per_boundary() {
        let counter = CountingAnalyzer::new();
        let runs = counter.runs();
        let mut w = worker("a1", ModuleKind::analyzer(counter), Arc::default());

        w.begin_run(3).await.unwrap();
        w.begin_run(3).await.unwrap();
        w.end_run(3).await.unwrap();
        w.end_run(3).await.unwrap();

        assert_eq!(runs.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn communicator_only_for_output_modules() {
        let mut analyzer = worker("a1", ModuleKind::analyzer(CountingAnalyzer::new()), Arc::default());
        assert!(analyzer.communicator().is_none());

        let output = RecordingOutput::new();
        let log = output.log();
        let mut out = worker("out", ModuleKind::output(output), Arc::default());
        let mut communicator = out.communicator().unwrap();
        assert_eq!(communicator.label(), "out");

        let file = FileBlock {
            source_label: "source".into(),
            process_name: "p".into(),
        };
        communicator.open_file(&file).await.unwrap();
        communicator.write_lumi(LumiId::new(1, 1)).await.unwrap();
        communicator.write_run(1).await.unwrap();
        assert!(communicator.should_close_file());
        communicator.close_file().await.unwrap();
        communicator.open_new_file_if_needed().await.unwrap();
        assert!(communicator.want_all_events());
        assert!(!communicator.limit_reached());

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "openFile",
                "writeLuminosityBlock",
                "writeRun",
                "closeFile",
                "openNewFileIfNeeded"
            ]
        );
    }

    #[tokio::test]
    async fn communicator_annotates_failures() {
        let output = RecordingOutput::failing_on_open();
        let mut out = worker("out", ModuleKind::output(output), Arc::default());
        let mut communicator = out.communicator().unwrap();

        let file = FileBlock {
            source_label: "source".into(),
            process_name: "p".into(),
        };
        let error = communicator.open_file(&file).await.unwrap_err();
        assert_eq!(error.label, "out");
        assert_eq!(error.phase, Phase::OpenFile);
    }
}
