//! Log store collaborator seam
//!
//! The engine never owns storage. [`LogStore`] is the shape a host's store
//! presents; [`InMemoryLogStore`] backs the CLI and tests.

use super::types::{DailyLogEntry, Metric};
use crate::error::EngineError;
use chrono::NaiveDate;
use std::collections::HashMap;
use uuid::Uuid;

/// Ordered access to a user's daily log entries
pub trait LogStore {
    /// Store an entry, assigning an id when it has none; returns the id
    fn append(&mut self, entry: DailyLogEntry) -> Result<String, EngineError>;

    /// Replace the entry with the given id
    fn edit(&mut self, id: &str, entry: DailyLogEntry) -> Result<(), EngineError>;

    /// Remove the entry with the given id, returning it
    fn delete(&mut self, id: &str) -> Result<DailyLogEntry, EngineError>;

    /// Entries for (user, metric) with `start <= date <= end`, ordered by
    /// date then timestamp then insertion
    fn range(
        &self,
        user_id: &str,
        metric: Metric,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyLogEntry>, EngineError>;
}

/// Vec-backed store keyed by user
#[derive(Debug, Default)]
pub struct InMemoryLogStore {
    entries: HashMap<String, Vec<DailyLogEntry>>,
}

impl InMemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already-parsed entries
    pub fn from_entries(entries: Vec<DailyLogEntry>) -> Result<Self, EngineError> {
        let mut store = Self::new();
        for entry in entries {
            store.append(entry)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn locate(&self, id: &str) -> Option<(String, usize)> {
        self.entries.iter().find_map(|(user, list)| {
            list.iter()
                .position(|e| e.id.as_deref() == Some(id))
                .map(|index| (user.clone(), index))
        })
    }
}

impl LogStore for InMemoryLogStore {
    fn append(&mut self, mut entry: DailyLogEntry) -> Result<String, EngineError> {
        entry.validate()?;
        let id = entry
            .id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();
        if self.locate(&id).is_some() {
            return Err(EngineError::InvalidEntry(format!("duplicate entry id {}", id)));
        }
        self.entries
            .entry(entry.user_id.clone())
            .or_default()
            .push(entry);
        Ok(id)
    }

    fn edit(&mut self, id: &str, mut entry: DailyLogEntry) -> Result<(), EngineError> {
        entry.validate()?;
        let (user, index) = self
            .locate(id)
            .ok_or_else(|| EngineError::InvalidEntry(format!("no entry with id {}", id)))?;
        entry.id = Some(id.to_string());

        if entry.user_id == user {
            if let Some(slot) = self.entries.get_mut(&user).and_then(|l| l.get_mut(index)) {
                *slot = entry;
            }
        } else {
            if let Some(list) = self.entries.get_mut(&user) {
                list.remove(index);
            }
            self.entries.entry(entry.user_id.clone()).or_default().push(entry);
        }
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<DailyLogEntry, EngineError> {
        let (user, index) = self
            .locate(id)
            .ok_or_else(|| EngineError::InvalidEntry(format!("no entry with id {}", id)))?;
        self.entries
            .get_mut(&user)
            .map(|list| list.remove(index))
            .ok_or_else(|| EngineError::InvalidEntry(format!("no entry with id {}", id)))
    }

    fn range(
        &self,
        user_id: &str,
        metric: Metric,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyLogEntry>, EngineError> {
        if start > end {
            return Err(EngineError::InvalidWindow(format!(
                "range start {} is after end {}",
                start, end
            )));
        }
        let mut out: Vec<DailyLogEntry> = self
            .entries
            .get(user_id)
            .map(|list| {
                list.iter()
                    .filter(|e| e.metric() == metric && e.date >= start && e.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        // Stable sort keeps insertion order for equal timestamps
        out.sort_by_key(|e| (e.date, e.timestamp_ms));
        Ok(out)
    }
}
