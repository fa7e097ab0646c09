// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;

use crate::config::{ParameterSet, ParameterSetId};
use crate::traits::ModuleTag;

/// Identity of one configured module: label, type name, kind and the
/// fingerprint of the parameters it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleDescription {
    label: String,
    type_name: String,
    kind: ModuleTag,
    fingerprint: ParameterSetId,
}

impl ModuleDescription {
    pub fn new(label: &str, type_name: &str, kind: ModuleTag, params: &ParameterSet) -> Self {
        Self {
            label: label.to_string(),
            type_name: type_name.to_string(),
            kind,
            fingerprint: params.id(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn kind(&self) -> ModuleTag {
        self.kind
    }

    pub fn fingerprint(&self) -> &ParameterSetId {
        &self.fingerprint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_follows_parameters() {
        let a = ModuleDescription::new(
            "m1",
            "IntProducer",
            ModuleTag::Producer,
            &ParameterSet::new().with("ivalue", 10),
        );
        let b = ModuleDescription::new(
            "m2",
            "IntProducer",
            ModuleTag::Producer,
            &ParameterSet::new().with("ivalue", 10),
        );
        let c = ModuleDescription::new(
            "m3",
            "IntProducer",
            ModuleTag::Producer,
            &ParameterSet::new().with("ivalue", 11),
        );

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.label(), "m1");
        assert_eq!(a.kind(), ModuleTag::Producer);
    }
}
