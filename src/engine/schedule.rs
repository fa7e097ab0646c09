// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Assembly of workers and paths from a configuration, and per-event
//! evaluation of that graph.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::backends::ModuleFactory;
use crate::config::consts::{SELECT_EVENTS_PARAM, TRIGGER_RESULTS_LABEL, TRIGGER_RESULTS_TYPE};
use crate::config::{validate_process_config, ParameterSet, PathConfig, ProcessConfig, ProcessContext};
use crate::engine::path::{Path, PathKind};
use crate::engine::report::{ModuleSummary, PathSummary};
use crate::engine::trigger_inserter::TriggerResultsInserter;
use crate::errors::{ConfigurationError, EngineError};
use crate::event::{Event, LumiId, PathStatus, ProductRegistry, RunNumber, TriggerResults};
use crate::observability::messages::config::{ConfigurationRejected, UnusedModule};
use crate::observability::messages::StructuredLog;
use crate::services::ActivityRegistry;
use crate::traits::{FileBlock, ModuleKind, ModuleTag, OutputModuleDescription, PathPositions};
use crate::worker::{ModuleDescription, Worker, WorkerParams};

/// Every worker of the job and the paths that reference them.
///
/// Workers are stored once, in first-appearance order across trigger paths
/// then end paths; paths hold indices into that list.
pub struct Schedule {
    process_name: String,
    workers: Vec<Worker>,
    trigger_paths: Vec<Path>,
    end_paths: Vec<Path>,
    inserter: Option<usize>,
    products: ProductRegistry,
}

impl Schedule {
    /// Validate `config` and build every module it schedules.
    ///
    /// Each module's parameters are registered in `context`. Declared modules
    /// that no path references are not built.
    pub fn build(
        config: &ProcessConfig,
        factory: &ModuleFactory,
        context: &mut ProcessContext,
        activity: &Arc<ActivityRegistry>,
    ) -> Result<Self, ConfigurationError> {
        if let Err(errors) = validate_process_config(config) {
            let error_count = errors.len();
            if let Some(first) = errors.into_iter().next() {
                ConfigurationRejected {
                    error_count,
                    first: &first,
                }
                .log();
                return Err(first);
            }
        }

        let params = WorkerParams {
            activity: activity.clone(),
        };
        let mut workers: Vec<Worker> = Vec::new();
        let mut indices: HashMap<String, usize> = HashMap::new();

        let mut build_paths = |paths: &[PathConfig], kind: PathKind| -> Result<Vec<Path>, ConfigurationError> {
            let mut built = Vec::with_capacity(paths.len());
            for (position, path) in paths.iter().enumerate() {
                let mut path_workers = Vec::with_capacity(path.modules.len());
                for label in &path.modules {
                    let index = match indices.get(label) {
                        Some(index) => *index,
                        None => {
                            let module_config = config.module(label).ok_or_else(|| {
                                ConfigurationError::UndeclaredModule {
                                    path: path.name.clone(),
                                    label: label.clone(),
                                }
                            })?;
                            let module = factory.create_module(module_config)?;
                            context.register(&module_config.params);
                            let description = ModuleDescription::new(
                                label,
                                &module_config.type_name,
                                module.tag(),
                                &module_config.params,
                            );
                            workers.push(Worker::new(module, description, &params));
                            indices.insert(label.clone(), workers.len() - 1);
                            workers.len() - 1
                        }
                    };
                    path_workers.push(index);
                }
                built.push(Path::new(&path.name, position, kind, path_workers));
            }
            Ok(built)
        };

        let trigger_paths = build_paths(&config.paths, PathKind::Trigger)?;
        let end_paths = build_paths(&config.end_paths, PathKind::End)?;

        for worker in workers.iter().filter(|w| w.kind() == ModuleTag::OutputModule) {
            let Some(module_config) = config.module(worker.label()) else {
                continue;
            };
            let selected = module_config
                .params
                .optional_strings(worker.label(), SELECT_EVENTS_PARAM)?;
            for name in selected {
                if !trigger_paths.iter().any(|path| path.name() == name) {
                    return Err(ConfigurationError::invalid(
                        worker.label(),
                        format!("{} names unknown trigger path '{}'", SELECT_EVENTS_PARAM, name),
                    ));
                }
            }
        }

        for module in &config.modules {
            if !indices.contains_key(&module.label) {
                UnusedModule {
                    label: &module.label,
                }
                .log();
            }
        }

        let inserter = if trigger_paths.is_empty() {
            None
        } else {
            let params_set = ParameterSet::new();
            context.register(&params_set);
            let module = ModuleKind::producer(TriggerResultsInserter);
            let description = ModuleDescription::new(
                TRIGGER_RESULTS_LABEL,
                TRIGGER_RESULTS_TYPE,
                module.tag(),
                &params_set,
            );
            workers.push(Worker::new(module, description, &params));
            Some(workers.len() - 1)
        };

        let mut products = ProductRegistry::new();
        for worker in &workers {
            for declaration in worker.products() {
                products.register(worker.label(), declaration);
            }
        }

        Ok(Self {
            process_name: config.process.clone(),
            workers,
            trigger_paths,
            end_paths,
            inserter,
            products,
        })
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn path_count(&self) -> usize {
        self.trigger_paths.len() + self.end_paths.len()
    }

    pub fn products(&self) -> &ProductRegistry {
        &self.products
    }

    pub fn module_descriptions(&self) -> Vec<ModuleDescription> {
        self.workers.iter().map(|w| w.description().clone()).collect()
    }

    pub fn has_outputs(&self) -> bool {
        self.workers.iter().any(|w| w.kind() == ModuleTag::OutputModule)
    }

    pub async fn begin_job(&mut self) -> Result<(), EngineError> {
        for worker in &mut self.workers {
            worker.begin_job().await?;
        }
        Ok(())
    }

    /// Call every worker's end-of-job hook, returning the first failure.
    pub async fn end_job(&mut self) -> Result<(), EngineError> {
        let mut first_error = None;
        for worker in &mut self.workers {
            if let Err(error) = worker.end_job().await {
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub async fn begin_run(&mut self, run: RunNumber) -> Result<(), EngineError> {
        for worker in &mut self.workers {
            worker.begin_run(run).await?;
        }
        Ok(())
    }

    pub async fn end_run(&mut self, run: RunNumber) -> Result<(), EngineError> {
        for worker in &mut self.workers {
            worker.end_run(run).await?;
        }
        Ok(())
    }

    pub async fn begin_lumi(&mut self, lumi: LumiId) -> Result<(), EngineError> {
        for worker in &mut self.workers {
            worker.begin_lumi(lumi).await?;
        }
        Ok(())
    }

    pub async fn end_lumi(&mut self, lumi: LumiId) -> Result<(), EngineError> {
        for worker in &mut self.workers {
            worker.end_lumi(lumi).await?;
        }
        Ok(())
    }

    /// Run one event through the trigger paths, the trigger results
    /// inserter and the end paths.
    ///
    /// Returns whether every trigger path accepted the event.
    pub async fn process_event(&mut self, event: &mut Event) -> Result<bool, EngineError> {
        self.workers.iter_mut().for_each(Worker::reset);

        let mut statuses = Vec::with_capacity(self.trigger_paths.len());
        let mut accepted = true;
        for path in &mut self.trigger_paths {
            let passed = path.process_event(&mut self.workers, event).await?;
            let status = if passed { PathStatus::Pass } else { PathStatus::Fail };
            statuses.push((path.name().to_string(), status));
            accepted &= passed;
        }
        event.set_trigger_results(TriggerResults::new(&self.process_name, statuses));

        if let Some(index) = self.inserter {
            if let Some(worker) = self.workers.get_mut(index) {
                worker.do_event(event).await?;
            }
        }

        for path in &mut self.end_paths {
            path.process_event(&mut self.workers, event).await?;
        }

        Ok(accepted)
    }

    /// Output module label -> every trigger path's name and position.
    fn path_positions(&self) -> PathPositions {
        let trigger: Vec<(String, usize)> = self
            .trigger_paths
            .iter()
            .map(|p| (p.name().to_string(), p.position()))
            .collect();

        self.workers
            .iter()
            .filter(|w| w.kind() == ModuleTag::OutputModule)
            .map(|w| (w.label().to_string(), trigger.clone()))
            .collect::<BTreeMap<_, _>>()
    }

    pub fn configure_outputs(&mut self, description: &OutputModuleDescription) {
        let positions = self.path_positions();
        let any_product_produced = !self.products.is_empty();
        for worker in &mut self.workers {
            if let Some(mut communicator) = worker.communicator() {
                communicator.configure(description);
                communicator.select_products(&self.products);
                communicator.set_event_selection_info(&positions, any_product_produced);
            }
        }
    }

    pub async fn open_output_files(&mut self, file: &FileBlock) -> Result<(), EngineError> {
        for worker in &mut self.workers {
            if let Some(mut communicator) = worker.communicator() {
                communicator.open_file(file).await?;
            }
        }
        Ok(())
    }

    /// Close every output file, returning the first failure.
    pub async fn close_output_files(&mut self) -> Result<(), EngineError> {
        let mut first_error = None;
        for worker in &mut self.workers {
            if let Some(mut communicator) = worker.communicator() {
                if let Err(error) = communicator.close_file().await {
                    first_error.get_or_insert(EngineError::from(error));
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Let each output module that asked for it switch to a new file.
    ///
    /// Called between events, once the boundaries the previous event closed
    /// have been written.
    pub async fn rotate_output_files(&mut self) -> Result<(), EngineError> {
        for worker in &mut self.workers {
            if let Some(mut communicator) = worker.communicator() {
                if communicator.should_close_file() {
                    communicator.close_file().await?;
                    communicator.open_new_file_if_needed().await?;
                }
            }
        }
        Ok(())
    }

    pub async fn write_run(&mut self, run: RunNumber) -> Result<(), EngineError> {
        for worker in &mut self.workers {
            if let Some(mut communicator) = worker.communicator() {
                communicator.write_run(run).await?;
            }
        }
        Ok(())
    }

    pub async fn write_lumi(&mut self, lumi: LumiId) -> Result<(), EngineError> {
        for worker in &mut self.workers {
            if let Some(mut communicator) = worker.communicator() {
                communicator.write_lumi(lumi).await?;
            }
        }
        Ok(())
    }

    /// True when the job has output modules and all of them reached their
    /// event limit.
    pub fn outputs_exhausted(&mut self) -> bool {
        let mut any = false;
        for worker in &mut self.workers {
            if let Some(communicator) = worker.communicator() {
                if !communicator.limit_reached() {
                    return false;
                }
                any = true;
            }
        }
        any
    }

    pub fn path_summaries(&self) -> Vec<PathSummary> {
        self.trigger_paths
            .iter()
            .chain(self.end_paths.iter())
            .map(|path| PathSummary {
                name: path.name().to_string(),
                kind: path.kind(),
                position: path.position(),
                modules: path
                    .worker_indices()
                    .iter()
                    .filter_map(|i| self.workers.get(*i))
                    .map(|w| w.label().to_string())
                    .collect(),
                counters: path.counters(),
            })
            .collect()
    }

    pub fn module_summaries(&self) -> Vec<ModuleSummary> {
        self.workers
            .iter()
            .map(|worker| ModuleSummary {
                label: worker.label().to_string(),
                type_name: worker.description().type_name().to_string(),
                kind: worker.kind(),
                counters: worker.counters(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{test_factory, JobControl};
    use crate::config::ModuleConfig;
    use crate::event::EventId;

    fn build(config: &ProcessConfig) -> Result<Schedule, ConfigurationError> {
        let factory = test_factory(Arc::new(JobControl::default()));
        let mut context = ProcessContext::new(&config.process);
        Schedule::build(config, &factory, &mut context, &Arc::new(ActivityRegistry::new()))
    }

    #[test]
    fn workers_are_shared_between_paths() {
        let config = ProcessConfig::new("p")
            .with_module(
                ModuleConfig::new("m1", "IntProducer")
                    .with_params(ParameterSet::new().with("ivalue", 1)),
            )
            .with_module(ModuleConfig::new("a1", "EventCounter"))
            .with_module(ModuleConfig::new("unused", "EventCounter"))
            .with_path("p1", &["m1", "a1"])
            .with_path("p2", &["m1"]);

        let schedule = build(&config).unwrap();
        let labels: Vec<&str> = schedule.workers().iter().map(Worker::label).collect();

        assert_eq!(labels, vec!["m1", "a1", TRIGGER_RESULTS_LABEL]);
        assert_eq!(schedule.workers()[2].kind(), ModuleTag::Producer);
        assert!(schedule.products().get("m1").is_some());
        assert!(schedule.products().get(TRIGGER_RESULTS_LABEL).is_some());
    }

    #[test]
    fn no_inserter_without_trigger_paths() {
        let config = ProcessConfig::new("p")
            .with_module(ModuleConfig::new("out", "MemoryOutput"))
            .with_end_path("e1", &["out"]);

        let schedule = build(&config).unwrap();
        assert_eq!(schedule.workers().len(), 1);
        assert!(schedule.has_outputs());
    }

    #[test]
    fn output_selection_must_name_trigger_paths() {
        struct TestCase {
            name: &'static str,
            selected: Vec<&'static str>,
            rejected: Option<&'static str>,
        }

        let test_cases = vec![
            TestCase {
                name: "known path",
                selected: vec!["p1"],
                rejected: None,
            },
            TestCase {
                name: "misspelled path",
                selected: vec!["p1", "typo"],
                rejected: Some("typo"),
            },
            TestCase {
                name: "end path is not a trigger path",
                selected: vec!["e1"],
                rejected: Some("e1"),
            },
        ];

        for case in test_cases {
            let config = ProcessConfig::new("p")
                .with_module(ModuleConfig::new("a1", "EventCounter"))
                .with_module(
                    ModuleConfig::new("out", "MemoryOutput")
                        .with_params(ParameterSet::new().with(SELECT_EVENTS_PARAM, case.selected)),
                )
                .with_path("p1", &["a1"])
                .with_end_path("e1", &["out"]);

            match (build(&config), case.rejected) {
                (Ok(_), None) => {}
                (Err(ConfigurationError::InvalidParameter { label, reason }), Some(path)) => {
                    assert_eq!(label, "out", "{}", case.name);
                    assert!(reason.contains(path), "{}: {}", case.name, reason);
                }
                (Ok(_), Some(_)) => panic!("{}: expected a rejection", case.name),
                (Err(error), _) => panic!("{}: unexpected error {}", case.name, error),
            }
        }
    }

    #[test]
    fn construction_errors_name_the_module() {
        let test_cases = vec![
            (ProcessConfig::new("p").with_path("p1", &["ghost"]), "ghost"),
            (
                ProcessConfig::new("p")
                    .with_module(
                        ModuleConfig::new("bad", "TestFailuresAnalyzer")
                            .with_params(ParameterSet::new().with("fail_at", "construction")),
                    )
                    .with_path("p1", &["bad"]),
                "bad",
            ),
            (
                ProcessConfig::new("p")
                    .with_module(ModuleConfig::new("odd", "NoSuchType"))
                    .with_path("p1", &["odd"]),
                "odd",
            ),
        ];

        for (config, label) in test_cases {
            let error = build(&config).err().unwrap();
            assert!(error.to_string().contains(label), "{}", error);
        }
    }

    #[tokio::test]
    async fn event_passes_only_when_every_trigger_path_accepts() {
        let config = ProcessConfig::new("p")
            .with_module(
                ModuleConfig::new("m1", "IntProducer")
                    .with_params(ParameterSet::new().with("ivalue", 3)),
            )
            .with_module(ModuleConfig::new("reject", "TestRejectingFilter"))
            .with_path("p1", &["m1"])
            .with_path("p2", &["reject"]);

        let mut schedule = build(&config).unwrap();
        let mut event = Event::new(EventId::new(1, 1, 1));

        assert!(!schedule.process_event(&mut event).await.unwrap());

        let results = event.get::<TriggerResults>(TRIGGER_RESULTS_LABEL).unwrap();
        assert_eq!(results.accept("p1"), Some(true));
        assert_eq!(results.accept("p2"), Some(false));
        assert_eq!(event.get::<i64>("m1"), Some(&3));
    }
}
