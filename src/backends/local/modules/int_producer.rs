use async_trait::async_trait;

use crate::config::ModuleConfig;
use crate::errors::ConfigurationError;
use crate::event::{Event, ProductDeclaration};
use crate::traits::{Module, ModuleResult, Producer};

/// Producer that puts a configured integer into every event under its label.
pub struct IntProducer {
    label: String,
    value: i64,
}

impl IntProducer {
    pub fn new(label: &str, value: i64) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }

    pub fn from_config(config: &ModuleConfig) -> Result<Self, ConfigurationError> {
        let value = config.params.require_i64(&config.label, "ivalue")?;
        Ok(Self::new(&config.label, value))
    }
}

impl Module for IntProducer {}

#[async_trait]
impl Producer for IntProducer {
    async fn produce(&mut self, event: &mut Event) -> ModuleResult {
        event.put(self.label.clone(), self.value);
        Ok(())
    }

    fn products(&self) -> Vec<ProductDeclaration> {
        vec![ProductDeclaration::new(self.label.clone(), "i64")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParameterSet;
    use crate::event::EventId;

    #[tokio::test]
    async fn puts_its_value_under_its_label() {
        let config = ModuleConfig::new("m1", "IntProducer")
            .with_params(ParameterSet::new().with("ivalue", 10));
        let mut producer = IntProducer::from_config(&config).unwrap();
        let mut event = Event::new(EventId::new(1, 1, 1));

        producer.produce(&mut event).await.unwrap();

        assert_eq!(event.get::<i64>("m1"), Some(&10));
        assert_eq!(producer.products(), vec![ProductDeclaration::new("m1", "i64")]);
    }

    #[test]
    fn requires_ivalue() {
        let error = IntProducer::from_config(&ModuleConfig::new("m1", "IntProducer"))
            .err()
            .unwrap();
        assert!(error.to_string().contains("ivalue"));
        assert!(error.to_string().contains("'m1'"));
    }
}
