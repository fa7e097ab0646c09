use crate::config::consts::{DEFAULT_FIRST_LUMI, DEFAULT_FIRST_RUN};
use crate::config::SourceConfig;
use crate::errors::{BoxError, ConfigurationError};
use crate::event::{EventId, LumiNumber, RunNumber};
use crate::traits::Source;

const SOURCE_LABEL: &str = "source";

/// Source that generates empty events.
///
/// Parameters:
/// - `first_run` (default 1)
/// - `first_lumi` (default 1)
/// - `events_per_lumi`: events before the lumi number advances; 0 or absent
///   keeps every event in one lumi
/// - `events`: total events before the input is exhausted; absent is unlimited
#[derive(Debug, Clone)]
pub struct EmptySource {
    run: RunNumber,
    first_lumi: LumiNumber,
    events_per_lumi: u64,
    limit: Option<u64>,
    emitted: u64,
}

impl EmptySource {
    pub fn new(first_run: RunNumber, limit: Option<u64>) -> Self {
        Self {
            run: first_run,
            first_lumi: DEFAULT_FIRST_LUMI,
            events_per_lumi: 0,
            limit,
            emitted: 0,
        }
    }

    pub fn with_events_per_lumi(mut self, events_per_lumi: u64) -> Self {
        self.events_per_lumi = events_per_lumi;
        self
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self, ConfigurationError> {
        let params = &config.params;
        let first_run = read_number(params.optional_u64(SOURCE_LABEL, "first_run")?, "first_run")?
            .unwrap_or(DEFAULT_FIRST_RUN);
        let first_lumi = read_number(params.optional_u64(SOURCE_LABEL, "first_lumi")?, "first_lumi")?
            .unwrap_or(DEFAULT_FIRST_LUMI);

        Ok(Self {
            run: first_run,
            first_lumi,
            events_per_lumi: params
                .optional_u64(SOURCE_LABEL, "events_per_lumi")?
                .unwrap_or(0),
            limit: params.optional_u64(SOURCE_LABEL, "events")?,
            emitted: 0,
        })
    }

    fn lumi_for(&self, index: u64) -> LumiNumber {
        let offset = match self.events_per_lumi {
            0 => 0,
            per_lumi => index / per_lumi,
        };
        LumiNumber::try_from(offset)
            .ok()
            .and_then(|offset| self.first_lumi.checked_add(offset))
            .unwrap_or(LumiNumber::MAX)
    }
}

fn read_number(value: Option<u64>, key: &str) -> Result<Option<u32>, ConfigurationError> {
    value
        .map(|v| {
            u32::try_from(v).map_err(|_| {
                ConfigurationError::invalid(
                    SOURCE_LABEL,
                    format!("parameter '{}' does not fit in 32 bits", key),
                )
            })
        })
        .transpose()
}

impl Source for EmptySource {
    fn label(&self) -> &str {
        SOURCE_LABEL
    }

    fn next_event(&mut self) -> Result<Option<EventId>, BoxError> {
        if self.limit.is_some_and(|limit| self.emitted >= limit) {
            return Ok(None);
        }
        let index = self.emitted;
        self.emitted += 1;
        Ok(Some(EventId::new(self.run, self.lumi_for(index), index + 1)))
    }

    fn set_run_number(&mut self, run: RunNumber) {
        self.run = run;
        self.emitted = 0;
    }

    fn rewind(&mut self) {
        self.emitted = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParameterSet;

    #[test]
    fn honours_event_limit_and_lumi_size() {
        let params = ParameterSet::new()
            .with("first_run", 5)
            .with("events_per_lumi", 2)
            .with("events", 3);
        let mut source = EmptySource::from_config(&SourceConfig::new("EmptySource", params)).unwrap();

        let ids: Vec<EventId> = std::iter::from_fn(|| source.next_event().unwrap()).collect();
        assert_eq!(
            ids,
            vec![
                EventId::new(5, 1, 1),
                EventId::new(5, 1, 2),
                EventId::new(5, 2, 3)
            ]
        );
    }

    #[test]
    fn rewind_and_run_number_restart_the_sequence() {
        let mut source = EmptySource::new(1, Some(1));
        assert!(source.next_event().unwrap().is_some());
        assert!(source.next_event().unwrap().is_none());

        source.rewind();
        assert_eq!(source.next_event().unwrap(), Some(EventId::new(1, 1, 1)));

        source.set_run_number(9);
        assert_eq!(source.next_event().unwrap(), Some(EventId::new(9, 1, 1)));
    }

    #[test]
    fn rejects_out_of_range_run() {
        let params = ParameterSet::new().with("first_run", u64::MAX);
        let error = EmptySource::from_config(&SourceConfig::new("EmptySource", params)).unwrap_err();
        assert!(error.to_string().contains("first_run"));
    }
}
