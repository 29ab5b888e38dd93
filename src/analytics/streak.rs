//! Streak computation
//!
//! A streak is a run of consecutive qualifying calendar days. The longest run
//! is found by driving [`StreakMachine`] forward over qualifying dates; the
//! current run is found by walking backward from the as-of date.

use super::aggregate::DaySeries;
use super::types::Metric;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Streak lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StreakStatus {
    /// No qualifying day has ever been observed
    NoHistory,
    /// The streak is alive through the as-of date
    Active { length: u32 },
    /// A gap ended the last run before the as-of date
    Broken,
}

/// Streak outcome for one metric (or one habit) at an as-of date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakState {
    pub metric: Metric,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_qualifying_date: Option<NaiveDate>,
    pub status: StreakStatus,
}

/// Forward state machine over qualifying dates
///
/// `NoHistory -> Active(1)` on the first qualifying day; `Active(n) -> Active(n+1)`
/// when the next qualifying day is consecutive; a gap moves to `Broken` and the
/// following qualifying day restarts at `Active(1)`.
#[derive(Debug, Clone)]
pub struct StreakMachine {
    status: StreakStatus,
    last_date: Option<NaiveDate>,
    longest: u32,
}

impl StreakMachine {
    pub fn new() -> Self {
        Self {
            status: StreakStatus::NoHistory,
            last_date: None,
            longest: 0,
        }
    }

    /// Feed the next qualifying date (must be strictly increasing)
    pub fn qualify(&mut self, date: NaiveDate) {
        let consecutive = self
            .last_date
            .map_or(false, |last| last + Duration::days(1) == date);

        self.status = match self.status {
            StreakStatus::Active { length } if consecutive => StreakStatus::Active { length: length + 1 },
            _ => StreakStatus::Active { length: 1 },
        };
        if let StreakStatus::Active { length } = self.status {
            self.longest = self.longest.max(length);
        }
        self.last_date = Some(date);
    }

    /// Close the machine at `as_of`, breaking the run if it ends before it
    pub fn settle(&mut self, as_of: NaiveDate) {
        if let (StreakStatus::Active { .. }, Some(last)) = (self.status, self.last_date) {
            if last < as_of {
                self.status = StreakStatus::Broken;
            }
        }
    }

    pub fn status(&self) -> StreakStatus {
        self.status
    }

    pub fn longest(&self) -> u32 {
        self.longest
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.last_date
    }
}

impl Default for StreakMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the streak state from aggregated day samples.
///
/// Samples after `as_of` are ignored. When `as_of` does not qualify the
/// current streak is 0, except with `pending_today_grace` where an as-of date
/// without any entry defers to the previous day.
pub fn compute_streak(
    days: &DaySeries,
    metric: Metric,
    as_of: NaiveDate,
    pending_today_grace: bool,
) -> StreakState {
    let mut machine = StreakMachine::new();
    for sample in days.range(..=as_of).map(|(_, s)| s).filter(|s| s.qualifies) {
        machine.qualify(sample.date);
    }

    let mut cursor = as_of;
    if pending_today_grace && !days.contains_key(&as_of) {
        cursor = as_of - Duration::days(1);
    }

    let mut current = 0u32;
    while days.get(&cursor).map_or(false, |s| s.qualifies) {
        current += 1;
        cursor -= Duration::days(1);
    }

    // A run ending yesterday stays pending under the grace rule
    let status = if current > 0 {
        StreakStatus::Active { length: current }
    } else {
        machine.settle(as_of);
        machine.status()
    };

    StreakState {
        metric,
        current_streak: current,
        longest_streak: machine.longest(),
        last_qualifying_date: machine.last_date(),
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::aggregate::DaySample;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(days: &[(&str, bool)]) -> DaySeries {
        days.iter()
            .map(|(d, q)| {
                let date = date(d);
                (
                    date,
                    DaySample {
                        date,
                        value: if *q { 1.0 } else { 0.0 },
                        qualifies: *q,
                        entry_count: 1,
                        quality_percent: None,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_no_history() {
        let state = compute_streak(&DaySeries::new(), Metric::Habit, date("2024-01-07"), false);
        assert_eq!(state.current_streak, 0);
        assert_eq!(state.longest_streak, 0);
        assert_eq!(state.status, StreakStatus::NoHistory);
        assert!(state.last_qualifying_date.is_none());
    }

    #[test]
    fn test_active_streak_through_as_of() {
        let days = series(&[
            ("2024-01-01", true),
            ("2024-01-02", true),
            ("2024-01-03", true),
        ]);
        let state = compute_streak(&days, Metric::Habit, date("2024-01-03"), false);
        assert_eq!(state.current_streak, 3);
        assert_eq!(state.longest_streak, 3);
        assert_eq!(state.status, StreakStatus::Active { length: 3 });
    }

    #[test]
    fn test_missed_day_breaks_streak() {
        let days = series(&[
            ("2024-01-01", true),
            ("2024-01-02", true),
            ("2024-01-03", true),
            ("2024-01-04", true),
            ("2024-01-05", true),
            ("2024-01-06", false),
        ]);
        let state = compute_streak(&days, Metric::Habit, date("2024-01-07"), false);
        assert_eq!(state.current_streak, 0);
        assert_eq!(state.longest_streak, 5);
        assert_eq!(state.status, StreakStatus::Broken);
        assert_eq!(state.last_qualifying_date, Some(date("2024-01-05")));
    }

    #[test]
    fn test_grace_defers_to_yesterday() {
        let days = series(&[("2024-01-05", true), ("2024-01-06", true)]);
        let strict = compute_streak(&days, Metric::Meditation, date("2024-01-07"), false);
        assert_eq!(strict.current_streak, 0);

        let graced = compute_streak(&days, Metric::Meditation, date("2024-01-07"), true);
        assert_eq!(graced.current_streak, 2);
        assert_eq!(graced.status, StreakStatus::Active { length: 2 });
    }

    #[test]
    fn test_grace_does_not_cover_explicit_miss() {
        let days = series(&[("2024-01-06", true), ("2024-01-07", false)]);
        let state = compute_streak(&days, Metric::Habit, date("2024-01-07"), true);
        assert_eq!(state.current_streak, 0);
    }

    #[test]
    fn test_future_days_ignored() {
        let days = series(&[
            ("2024-01-01", true),
            ("2024-01-02", true),
            ("2024-01-03", true),
            ("2024-01-04", true),
        ]);
        let state = compute_streak(&days, Metric::Habit, date("2024-01-02"), false);
        assert_eq!(state.current_streak, 2);
        assert_eq!(state.longest_streak, 2);
    }

    #[test]
    fn test_longest_never_below_current() {
        let days = series(&[
            ("2024-01-01", true),
            ("2024-01-03", true),
            ("2024-01-04", true),
        ]);
        let state = compute_streak(&days, Metric::Habit, date("2024-01-04"), false);
        assert_eq!(state.current_streak, 2);
        assert!(state.longest_streak >= state.current_streak);
    }

    #[test]
    fn test_machine_transitions() {
        let mut machine = StreakMachine::new();
        assert_eq!(machine.status(), StreakStatus::NoHistory);
        machine.qualify(date("2024-01-01"));
        assert_eq!(machine.status(), StreakStatus::Active { length: 1 });
        machine.qualify(date("2024-01-02"));
        assert_eq!(machine.status(), StreakStatus::Active { length: 2 });
        machine.qualify(date("2024-01-05"));
        assert_eq!(machine.status(), StreakStatus::Active { length: 1 });
        assert_eq!(machine.longest(), 2);
        machine.settle(date("2024-01-07"));
        assert_eq!(machine.status(), StreakStatus::Broken);
    }
}
