//! Plan history with soft supersession
//!
//! Exactly one bundle is active at a time. Regeneration appends a new record
//! and deactivates the previous one; nothing is deleted. A failed regeneration
//! leaves the active record untouched.

use super::PlanBundle;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub id: Uuid,
    pub created_at_ms: i64,
    pub active: bool,
    pub bundle: PlanBundle,
}

/// Per-user record of every generated bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanHistory {
    records: Vec<PlanRecord>,
}

impl PlanHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `generate` and, only if it succeeds, make its bundle the active one
    pub fn regenerate<F>(&mut self, now_ms: i64, generate: F) -> Result<&PlanRecord, EngineError>
    where
        F: FnOnce() -> Result<PlanBundle, EngineError>,
    {
        let bundle = generate()?;
        Ok(self.supersede(bundle, now_ms))
    }

    /// Record a bundle as the new active plan
    pub fn supersede(&mut self, bundle: PlanBundle, now_ms: i64) -> &PlanRecord {
        let previous = self.records.iter_mut().find(|r| r.active).map(|r| {
            r.active = false;
            r.id
        });

        let record = PlanRecord {
            id: Uuid::new_v4(),
            created_at_ms: now_ms,
            active: true,
            bundle,
        };
        info!(
            plan_id = %record.id,
            user_id = %record.bundle.user_id,
            superseded = ?previous,
            "plan bundle activated"
        );
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn active(&self) -> Option<&PlanRecord> {
        self.records.iter().find(|r| r.active)
    }

    /// All records, oldest first
    pub fn history(&self) -> &[PlanRecord] {
        &self.records
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let history: PlanHistory = serde_json::from_str(json)?;
        if history.records.iter().filter(|r| r.active).count() > 1 {
            return Err(EngineError::PlanRejected(
                "history has more than one active plan".into(),
            ));
        }
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Catalog, GeneratorOptions, PlanGenerator};
    use crate::profile::tests::sample_profile;
    use crate::targets::TargetCalculator;

    fn bundle(seed: u64) -> PlanBundle {
        let profile = sample_profile();
        let targets = TargetCalculator::default().compute(&profile).unwrap();
        PlanGenerator::default()
            .generate(&profile, &targets, &Catalog::builtin(), GeneratorOptions::with_seed(seed))
            .unwrap()
    }

    #[test]
    fn test_supersession() {
        let mut history = PlanHistory::new();
        assert!(history.active().is_none());

        let first = history.regenerate(1, || Ok(bundle(1))).unwrap().id;
        let second = history.regenerate(2, || Ok(bundle(2))).unwrap().id;

        assert_ne!(first, second);
        assert_eq!(history.history().len(), 2);
        assert_eq!(history.active().unwrap().id, second);
        assert!(!history.history()[0].active);
        assert_eq!(history.history().iter().filter(|r| r.active).count(), 1);
    }

    #[test]
    fn test_failed_regeneration_keeps_active() {
        let mut history = PlanHistory::new();
        let first = history.regenerate(1, || Ok(bundle(1))).unwrap().id;

        let result = history.regenerate(2, || {
            Err(EngineError::InsufficientCatalog("no exercises".into()))
        });
        assert!(result.is_err());
        assert_eq!(history.active().unwrap().id, first);
        assert_eq!(history.history().len(), 1);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut history = PlanHistory::new();
        history.regenerate(1, || Ok(bundle(1))).unwrap();
        let restored = PlanHistory::from_json(&history.to_json().unwrap()).unwrap();
        assert_eq!(restored.history().len(), 1);
        assert_eq!(restored.active().unwrap().id, history.active().unwrap().id);
        assert_eq!(
            restored.active().unwrap().bundle.fitness,
            history.active().unwrap().bundle.fitness
        );
    }
}
