use async_trait::async_trait;

use crate::config::ModuleConfig;
use crate::errors::ConfigurationError;
use crate::event::Event;
use crate::traits::{Filter, Module, ModuleResult};

/// Filter accepting one event in every `prescale_factor`, shifted by `offset`.
pub struct Prescaler {
    factor: u64,
    offset: u64,
    seen: u64,
}

impl Prescaler {
    pub fn from_config(config: &ModuleConfig) -> Result<Self, ConfigurationError> {
        let factor = config
            .params
            .optional_u64(&config.label, "prescale_factor")?
            .unwrap_or(1);
        if factor == 0 {
            return Err(ConfigurationError::invalid(
                &config.label,
                "parameter 'prescale_factor' must be at least 1",
            ));
        }
        let offset = config
            .params
            .optional_u64(&config.label, "offset")?
            .unwrap_or(0);

        Ok(Self {
            factor,
            offset,
            seen: 0,
        })
    }
}

impl Module for Prescaler {}

#[async_trait]
impl Filter for Prescaler {
    async fn filter(&mut self, _event: &mut Event) -> ModuleResult<bool> {
        self.seen += 1;
        Ok((self.seen + self.offset) % self.factor == 0)
    }
}
