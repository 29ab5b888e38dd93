//! Daily aggregation
//!
//! Collapses the entries of each calendar day into one sample, applying the
//! metric's aggregation rule (sum or last-write-wins) and completion predicate.

use super::types::{Aggregation, DailyLogEntry, LogPayload, Metric};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated value of one metric on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySample {
    pub date: NaiveDate,
    pub value: f64,
    /// Whether the day meets the metric's completion predicate
    pub qualifies: bool,
    /// Number of raw entries folded into this sample
    pub entry_count: usize,
    /// Sleep quality of the winning sleep entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_percent: Option<f64>,
}

/// Ordered per-day samples for a single metric
pub type DaySeries = BTreeMap<NaiveDate, DaySample>;

/// Aggregator for turning raw entries into per-day samples
pub struct DailyAggregator;

impl DailyAggregator {
    /// Aggregate `entries` for `metric`, ignoring other metrics and any entry
    /// dated after `until`.
    ///
    /// Last-write ties on `timestamp_ms` go to the entry appearing later in
    /// the slice, so a resolved view from the log store is respected.
    pub fn aggregate(entries: &[DailyLogEntry], metric: Metric, until: NaiveDate) -> DaySeries {
        let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

        for (position, entry) in entries.iter().enumerate() {
            if entry.metric() != metric || entry.date > until {
                continue;
            }
            days.entry(entry.date)
                .or_default()
                .add(entry, position);
        }

        days.into_iter()
            .map(|(date, acc)| (date, acc.finish(date, metric)))
            .collect()
    }
}

#[derive(Default)]
struct DayAccumulator<'a> {
    sum: f64,
    count: usize,
    latest: Option<(i64, usize, &'a LogPayload)>,
    /// Latest completion state per habit id
    habits: BTreeMap<&'a str, (i64, usize, bool)>,
}

impl<'a> DayAccumulator<'a> {
    fn add(&mut self, entry: &'a DailyLogEntry, position: usize) {
        self.count += 1;
        self.sum += entry.payload.value();

        let key = (entry.timestamp_ms, position);
        if self.latest.map_or(true, |(ts, pos, _)| key >= (ts, pos)) {
            self.latest = Some((entry.timestamp_ms, position, &entry.payload));
        }

        if let LogPayload::Habit { habit_id, completed } = &entry.payload {
            let slot = self
                .habits
                .entry(habit_id.as_str())
                .or_insert((entry.timestamp_ms, position, *completed));
            if key >= (slot.0, slot.1) {
                *slot = (entry.timestamp_ms, position, *completed);
            }
        }
    }

    fn finish(self, date: NaiveDate, metric: Metric) -> DaySample {
        let mut quality_percent = None;

        let (value, qualifies) = match metric.aggregation() {
            Aggregation::Sum => (self.sum, self.sum > 0.0),
            Aggregation::LastWrite if metric == Metric::Habit => {
                // Completion ratio across the habits logged that day
                let total = self.habits.len().max(1) as f64;
                let done = self.habits.values().filter(|(_, _, completed)| *completed).count();
                (done as f64 / total, done > 0)
            }
            Aggregation::LastWrite => match self.latest {
                Some((_, _, payload)) => {
                    if let LogPayload::Sleep { quality_percent: q, .. } = payload {
                        quality_percent = *q;
                    }
                    (payload.value(), qualifies(payload))
                }
                None => (0.0, false),
            },
        };

        DaySample {
            date,
            value,
            qualifies,
            entry_count: self.count,
            quality_percent,
        }
    }
}

/// Completion predicate for last-write metrics
fn qualifies(payload: &LogPayload) -> bool {
    match payload {
        // Any logged sleep or mood value counts
        LogPayload::Sleep { .. } | LogPayload::Mood { .. } => true,
        LogPayload::Habit { completed, .. } => *completed,
        LogPayload::SugarControl { is_sugar_free } => *is_sugar_free,
        other => other.value() > 0.0,
    }
}
