//! Wellness dashboard summary
//!
//! Combines the 7-day views of sleep, mood, meditation, reflection and habits
//! into the figures a wellness dashboard shows at a glance.

use super::aggregate::DailyAggregator;
use super::pipeline::MetricAnalyzer;
use super::rolling::StabilityScore;
use super::streak::compute_streak;
use super::types::{DailyLogEntry, LogPayload, Metric};
use crate::error::EngineError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Nights at or above this many hours count as good nights
pub const GOOD_NIGHT_HOURS: f64 = 7.0;

/// Number of habits listed in the summary
pub const TOP_HABIT_COUNT: usize = 3;

/// Streak of a single habit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitStreak {
    pub habit_id: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub completed_today: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessSummary {
    pub as_of: NaiveDate,
    pub sleep_average_hours: Option<f64>,
    pub good_nights: usize,
    pub sleep_quality_average: Option<f64>,
    /// Night-to-night standard deviation (hours, one decimal)
    pub sleep_consistency_hours: f64,
    pub mood_average: Option<f64>,
    pub mood_stability: StabilityScore,
    pub meditation_minutes: f64,
    pub reflection_entries: u32,
    pub habits_tracked: usize,
    pub habits_completed_today: usize,
    pub habit_completion_today_pct: u8,
    pub top_habits: Vec<HabitStreak>,
}

impl WellnessSummary {
    /// Build the summary from a mixed-metric slice of entries
    pub fn compute(
        analyzer: &MetricAnalyzer,
        entries: &[DailyLogEntry],
        as_of: NaiveDate,
    ) -> Result<Self, EngineError> {
        let window_days = analyzer.config().default_window_days;
        let window = analyzer.window(as_of, window_days)?;

        let sleep = analyzer.analyze_window(entries, Metric::Sleep, window)?;
        let mood = analyzer.analyze_window(entries, Metric::Mood, window)?;
        let meditation = analyzer.analyze_window(entries, Metric::Meditation, window)?;
        let reflection = analyzer.analyze_window(entries, Metric::Reflection, window)?;

        let sleep_days = DailyAggregator::aggregate(entries, Metric::Sleep, as_of);
        let good_nights = window
            .samples(&sleep_days)
            .filter(|s| s.value >= GOOD_NIGHT_HOURS)
            .count();

        // Habits count as tracked when logged inside the window
        let tracked: BTreeSet<&str> = entries
            .iter()
            .filter(|e| window.contains(e.date))
            .filter_map(|e| e.payload.habit_id())
            .collect();
        let mut habits = habit_streaks(entries, as_of, analyzer.config().pending_today_grace);
        habits.retain(|h| tracked.contains(h.habit_id.as_str()));

        let habits_tracked = habits.len();
        let habits_completed_today = habits.iter().filter(|h| h.completed_today).count();
        let habit_completion_today_pct = if habits_tracked == 0 {
            0
        } else {
            (habits_completed_today as f64 / habits_tracked as f64 * 100.0).round() as u8
        };

        habits.sort_by(|a, b| {
            b.current_streak
                .cmp(&a.current_streak)
                .then(b.longest_streak.cmp(&a.longest_streak))
                .then(a.habit_id.cmp(&b.habit_id))
        });
        habits.truncate(TOP_HABIT_COUNT);

        Ok(Self {
            as_of,
            sleep_average_hours: sleep.rolling_average,
            good_nights,
            sleep_quality_average: sleep.sleep_quality_average,
            sleep_consistency_hours: (sleep.stability.std_dev * 10.0).round() / 10.0,
            mood_average: mood.rolling_average,
            mood_stability: mood.stability,
            meditation_minutes: meditation.window_total,
            reflection_entries: reflection.window_total.round() as u32,
            habits_tracked,
            habits_completed_today,
            habit_completion_today_pct,
            top_habits: habits,
        })
    }
}

/// Per-habit streaks, each computed from that habit's own entries
pub fn habit_streaks(entries: &[DailyLogEntry], as_of: NaiveDate, pending_today_grace: bool) -> Vec<HabitStreak> {
    let mut by_habit: BTreeMap<&str, Vec<DailyLogEntry>> = BTreeMap::new();
    for entry in entries {
        if let LogPayload::Habit { habit_id, .. } = &entry.payload {
            by_habit.entry(habit_id.as_str()).or_default().push(entry.clone());
        }
    }

    by_habit
        .into_iter()
        .map(|(habit_id, slice)| {
            let days = DailyAggregator::aggregate(&slice, Metric::Habit, as_of);
            let streak = compute_streak(&days, Metric::Habit, as_of, pending_today_grace);
            HabitStreak {
                habit_id: habit_id.to_string(),
                current_streak: streak.current_streak,
                longest_streak: streak.longest_streak,
                completed_today: days.get(&as_of).map_or(false, |s| s.qualifies),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn at(day: NaiveDate, payload: LogPayload) -> DailyLogEntry {
        DailyLogEntry::new("u1", day, 0, payload)
    }

    fn habit(id: &str, done: bool) -> LogPayload {
        LogPayload::Habit { habit_id: id.into(), completed: done }
    }

    fn week() -> Vec<DailyLogEntry> {
        let start = date("2024-01-01");
        let mut entries = Vec::new();
        for i in 0..7 {
            let day = start + Duration::days(i);
            let hours = if i % 2 == 0 { 8.0 } else { 6.0 };
            entries.push(at(day, LogPayload::Sleep { hours, quality_percent: Some(75.0) }));
            entries.push(at(day, LogPayload::Mood { score: 4 }));
            entries.push(at(day, LogPayload::Meditation { duration_minutes: 10.0 }));
            entries.push(at(day, habit("water", true)));
            entries.push(at(day, habit("read", i >= 4)));
        }
        entries.push(at(date("2024-01-03"), LogPayload::Reflection { count: 2 }));
        entries.push(at(date("2024-01-07"), habit("stretch", false)));
        entries
    }

    #[test]
    fn test_week_summary() {
        let summary =
            WellnessSummary::compute(&MetricAnalyzer::default(), &week(), date("2024-01-07"))
                .unwrap();

        // 4 nights of 8h, 3 nights of 6h
        assert!((summary.sleep_average_hours.unwrap() - 50.0 / 7.0).abs() < 0.001);
        assert_eq!(summary.good_nights, 4);
        assert_eq!(summary.sleep_quality_average, Some(75.0));
        assert!((summary.sleep_consistency_hours - 1.0).abs() < 0.001);
        assert_eq!(summary.mood_average, Some(4.0));
        assert_eq!(summary.mood_stability.score, 100);
        assert_eq!(summary.meditation_minutes, 70.0);
        assert_eq!(summary.reflection_entries, 2);
        assert_eq!(summary.habits_tracked, 3);
        assert_eq!(summary.habits_completed_today, 2);
        assert_eq!(summary.habit_completion_today_pct, 67);
    }

    #[test]
    fn test_top_habits_ranked_by_current_streak() {
        let summary =
            WellnessSummary::compute(&MetricAnalyzer::default(), &week(), date("2024-01-07"))
                .unwrap();
        let ids: Vec<_> = summary.top_habits.iter().map(|h| h.habit_id.as_str()).collect();
        assert_eq!(ids, vec!["water", "read", "stretch"]);
        assert_eq!(summary.top_habits[0].current_streak, 7);
        assert_eq!(summary.top_habits[1].current_streak, 3);
        assert_eq!(summary.top_habits[2].current_streak, 0);
    }

    #[test]
    fn test_empty_summary() {
        let summary =
            WellnessSummary::compute(&MetricAnalyzer::default(), &[], date("2024-01-07")).unwrap();
        assert_eq!(summary.sleep_average_hours, None);
        assert_eq!(summary.good_nights, 0);
        assert_eq!(summary.habit_completion_today_pct, 0);
        assert!(summary.top_habits.is_empty());
    }

    #[test]
    fn test_habit_streaks_are_independent() {
        let entries = vec![
            at(date("2024-01-06"), habit("a", true)),
            at(date("2024-01-07"), habit("a", true)),
            at(date("2024-01-07"), habit("b", true)),
            at(date("2024-01-06"), habit("b", false)),
        ];
        let streaks = habit_streaks(&entries, date("2024-01-07"), false);
        assert_eq!(streaks[0].habit_id, "a");
        assert_eq!(streaks[0].current_streak, 2);
        assert_eq!(streaks[1].current_streak, 1);
    }
}
