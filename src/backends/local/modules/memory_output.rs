use async_trait::async_trait;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::consts::SELECT_EVENTS_PARAM;
use crate::config::ModuleConfig;
use crate::errors::ConfigurationError;
use crate::event::{Event, EventId, LumiId, ProductDescription, ProductRegistry, RunNumber};
use crate::observability::messages::worker::OutputFileBoundary;
use crate::observability::messages::StructuredLog;
use crate::traits::{
    FileBlock, Module, ModuleResult, OutputModule, OutputModuleDescription, PathPositions,
};

/// One event as persisted by [`MemoryOutput`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenEvent {
    pub id: EventId,
    pub products: Vec<String>,
}

/// One in-memory output "file".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputFile {
    pub source_label: String,
    pub process_name: String,
    pub events: Vec<WrittenEvent>,
    pub lumis: Vec<LumiId>,
    pub runs: Vec<RunNumber>,
    pub closed: bool,
}

/// Shared handle to everything a [`MemoryOutput`] has written.
pub type OutputSink = Arc<Mutex<Vec<OutputFile>>>;

/// Output module that records written events into in-memory files.
///
/// Parameters:
/// - `max_events_per_file`: rotate to a new file after this many events
/// - `select_events`: trigger path names; an event is written when any of
///   them accepted it. Empty writes every event.
/// - `keep`: product names to persist; empty keeps every declared product
pub struct MemoryOutput {
    label: String,
    max_events_per_file: Option<u64>,
    select_events: Vec<String>,
    keep: Vec<String>,
    max_events: Option<u64>,
    selected: Vec<ProductDescription>,
    positions: Vec<usize>,
    written: u64,
    file: Option<FileBlock>,
    current: Option<usize>,
    sink: OutputSink,
}

impl MemoryOutput {
    pub fn from_config(config: &ModuleConfig) -> Result<Self, ConfigurationError> {
        let label = &config.label;
        let max_events_per_file = config.params.optional_u64(label, "max_events_per_file")?;
        if max_events_per_file == Some(0) {
            return Err(ConfigurationError::invalid(
                label,
                "parameter 'max_events_per_file' must be at least 1",
            ));
        }

        Ok(Self {
            label: label.clone(),
            max_events_per_file,
            select_events: config.params.optional_strings(label, SELECT_EVENTS_PARAM)?,
            keep: config.params.optional_strings(label, "keep")?,
            max_events: None,
            selected: Vec::new(),
            positions: Vec::new(),
            written: 0,
            file: None,
            current: None,
            sink: OutputSink::default(),
        })
    }

    /// Record into `sink` instead of a private buffer.
    pub fn with_sink(mut self, sink: OutputSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn sink(&self) -> OutputSink {
        self.sink.clone()
    }

    fn files(&self) -> MutexGuard<'_, Vec<OutputFile>> {
        self.sink
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn selected_by_trigger(&self, event: &Event) -> bool {
        if self.want_all_events() {
            return true;
        }
        event.trigger_results().is_some_and(|results| {
            self.positions
                .iter()
                .any(|position| results.accept_at(*position))
        })
    }

    fn start_file(&mut self, file: &FileBlock) {
        let index = {
            let mut files = self.files();
            files.push(OutputFile {
                source_label: file.source_label.clone(),
                process_name: file.process_name.clone(),
                ..OutputFile::default()
            });
            files.len() - 1
        };
        self.current = Some(index);
        OutputFileBoundary {
            label: &self.label,
            action: "opened",
            file_index: index,
        }
        .log();
    }

    fn events_in_current_file(&self) -> u64 {
        self.current
            .and_then(|index| self.files().get(index).map(|f| f.events.len() as u64))
            .unwrap_or(0)
    }

    fn with_current<F: FnOnce(&mut OutputFile)>(&self, update: F) -> ModuleResult {
        let index = self
            .current
            .ok_or_else(|| format!("output module '{}' has no open file", self.label))?;
        let mut files = self.files();
        let file = files
            .get_mut(index)
            .ok_or_else(|| format!("output file #{} is missing", index))?;
        update(file);
        Ok(())
    }
}

impl Module for MemoryOutput {}

#[async_trait]
impl OutputModule for MemoryOutput {
    async fn write(&mut self, event: &Event) -> ModuleResult {
        if self.limit_reached() || !self.selected_by_trigger(event) {
            return Ok(());
        }

        let products: Vec<String> = self
            .selected
            .iter()
            .filter(|product| event.contains(&product.name))
            .map(|product| product.name.clone())
            .collect();
        let id = event.id();
        self.with_current(|file| file.events.push(WrittenEvent { id, products }))?;
        self.written += 1;
        Ok(())
    }

    async fn open_file(&mut self, file: &FileBlock) -> ModuleResult {
        self.file = Some(file.clone());
        self.start_file(file);
        Ok(())
    }

    async fn close_file(&mut self) -> ModuleResult {
        if let Some(index) = self.current {
            self.with_current(|file| file.closed = true)?;
            self.current = None;
            OutputFileBoundary {
                label: &self.label,
                action: "closed",
                file_index: index,
            }
            .log();
        }
        Ok(())
    }

    async fn open_new_file_if_needed(&mut self) -> ModuleResult {
        if self.current.is_none() {
            if let Some(file) = self.file.clone() {
                self.start_file(&file);
            }
        }
        Ok(())
    }

    async fn write_run(&mut self, run: RunNumber) -> ModuleResult {
        self.with_current(|file| file.runs.push(run))
    }

    async fn write_lumi(&mut self, lumi: LumiId) -> ModuleResult {
        self.with_current(|file| file.lumis.push(lumi))
    }

    fn should_close_file(&self) -> bool {
        self.max_events_per_file
            .is_some_and(|max| self.events_in_current_file() >= max)
    }

    fn want_all_events(&self) -> bool {
        self.select_events.is_empty()
    }

    fn limit_reached(&self) -> bool {
        self.max_events.is_some_and(|max| self.written >= max)
    }

    fn configure(&mut self, description: &OutputModuleDescription) {
        self.max_events = description.max_events;
    }

    fn selected_products(&self) -> &[ProductDescription] {
        &self.selected
    }

    fn select_products(&mut self, registry: &ProductRegistry) {
        self.selected = registry
            .iter()
            .filter(|product| self.keep.is_empty() || self.keep.contains(&product.name))
            .cloned()
            .collect();
    }

    fn set_event_selection_info(&mut self, path_positions: &PathPositions, _any_product_produced: bool) {
        self.positions = path_positions
            .get(&self.label)
            .map(|paths| {
                paths
                    .iter()
                    .filter(|(name, _)| self.select_events.contains(name))
                    .map(|(_, position)| *position)
                    .collect()
            })
            .unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParameterSet;
    use crate::event::{PathStatus, ProductDeclaration, TriggerResults};
    use std::collections::BTreeMap;

    fn output(params: ParameterSet) -> MemoryOutput {
        MemoryOutput::from_config(&ModuleConfig::new("out", "MemoryOutput").with_params(params))
            .unwrap()
    }

    fn file_block() -> FileBlock {
        FileBlock {
            source_label: "source".into(),
            process_name: "p".into(),
        }
    }

    #[tokio::test]
    async fn rotates_after_max_events_per_file() {
        let mut out = output(ParameterSet::new().with("max_events_per_file", 2));
        let sink = out.sink();
        out.open_file(&file_block()).await.unwrap();

        for n in 1..=3 {
            out.write(&Event::new(EventId::new(1, 1, n))).await.unwrap();
            if out.should_close_file() {
                out.close_file().await.unwrap();
                out.open_new_file_if_needed().await.unwrap();
            }
        }

        let files = sink.lock().unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].closed);
        assert_eq!(files[0].events.len(), 2);
        assert_eq!(files[1].events.len(), 1);
        assert!(!files[1].closed);
    }

    #[tokio::test]
    async fn writes_only_selected_events_and_products() {
        let mut out = output(
            ParameterSet::new()
                .with("select_events", vec!["p2"])
                .with("keep", vec!["m1"]),
        );
        let sink = out.sink();

        let mut registry = ProductRegistry::new();
        registry.register("m1", ProductDeclaration::new("m1", "i64"));
        registry.register("m2", ProductDeclaration::new("m2", "i64"));
        out.select_products(&registry);
        assert_eq!(out.selected_products().len(), 1);

        let mut positions = BTreeMap::new();
        positions.insert(
            "out".to_string(),
            vec![("p1".to_string(), 0), ("p2".to_string(), 1)],
        );
        out.set_event_selection_info(&positions, true);
        assert!(!out.want_all_events());
        out.open_file(&file_block()).await.unwrap();

        let mut accepted = Event::new(EventId::new(1, 1, 1));
        accepted.put("m1", 1_i64);
        accepted.put("m2", 2_i64);
        accepted.set_trigger_results(TriggerResults::new(
            "p",
            vec![("p1".into(), PathStatus::Fail), ("p2".into(), PathStatus::Pass)],
        ));
        let mut rejected = Event::new(EventId::new(1, 1, 2));
        rejected.set_trigger_results(TriggerResults::new(
            "p",
            vec![("p1".into(), PathStatus::Pass), ("p2".into(), PathStatus::Fail)],
        ));

        out.write(&accepted).await.unwrap();
        out.write(&rejected).await.unwrap();

        let files = sink.lock().unwrap();
        assert_eq!(
            files[0].events,
            vec![WrittenEvent {
                id: EventId::new(1, 1, 1),
                products: vec!["m1".to_string()],
            }]
        );
    }

    #[tokio::test]
    async fn stops_at_configured_limit() {
        let mut out = output(ParameterSet::new());
        out.configure(&OutputModuleDescription { max_events: Some(1) });
        out.open_file(&file_block()).await.unwrap();

        assert!(!out.limit_reached());
        out.write(&Event::new(EventId::new(1, 1, 1))).await.unwrap();
        assert!(out.limit_reached());
        out.write(&Event::new(EventId::new(1, 1, 2))).await.unwrap();
        assert_eq!(out.sink().lock().unwrap()[0].events.len(), 1);
    }

    #[tokio::test]
    async fn writing_without_a_file_is_an_error() {
        let mut out = output(ParameterSet::new());
        let error = out.write_run(1).await.unwrap_err();
        assert!(error.to_string().contains("no open file"));
    }
}
