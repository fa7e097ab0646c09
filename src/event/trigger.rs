// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;

/// Outcome of one trigger path for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStatus {
    /// The path did not run (an earlier error aborted the event).
    Ready,
    Pass,
    Fail,
}

/// Per-event record of every trigger path's decision, in path declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerResults {
    process: String,
    paths: Vec<(String, PathStatus)>,
}

impl TriggerResults {
    pub fn new(process: impl Into<String>, paths: Vec<(String, PathStatus)>) -> Self {
        Self {
            process: process.into(),
            paths,
        }
    }

    pub fn process(&self) -> &str {
        &self.process
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Decision of the path at `position`, if it ran.
    pub fn accept_at(&self, position: usize) -> bool {
        matches!(self.paths.get(position), Some((_, PathStatus::Pass)))
    }

    pub fn accept(&self, path: &str) -> Option<bool> {
        self.paths
            .iter()
            .find(|(name, _)| name == path)
            .map(|(_, status)| *status == PathStatus::Pass)
    }

    pub fn status(&self, path: &str) -> Option<PathStatus> {
        self.paths
            .iter()
            .find(|(name, _)| name == path)
            .map(|(_, status)| *status)
    }

    /// True when every path accepted the event (vacuously true with no paths).
    pub fn accept_all(&self) -> bool {
        self.paths.iter().all(|(_, status)| *status == PathStatus::Pass)
    }

    pub fn accept_any(&self) -> bool {
        self.paths.iter().any(|(_, status)| *status == PathStatus::Pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decisions_by_name_and_position() {
        let results = TriggerResults::new(
            "p",
            vec![
                ("p1".to_string(), PathStatus::Pass),
                ("p2".to_string(), PathStatus::Fail),
            ],
        );

        assert_eq!(results.accept("p1"), Some(true));
        assert_eq!(results.accept("p2"), Some(false));
        assert_eq!(results.accept("missing"), None);
        assert!(results.accept_at(0));
        assert!(!results.accept_at(1));
        assert!(!results.accept_at(7));
        assert!(results.accept_any());
        assert!(!results.accept_all());
    }

    #[test]
    fn empty_results_accept_all() {
        let results = TriggerResults::new("p", vec![]);
        assert!(results.is_empty());
        assert!(results.accept_all());
        assert!(!results.accept_any());
    }
}
