//! Analytics & streak engine
//!
//! Derives longitudinal statistics from daily logs (sleep, mood, habits,
//! meditation, reflection, sugar control, water, steps, workouts).
//!
//! Pipeline: Entries → Daily aggregation → Streak / Rolling / Stability → Recommendations

pub mod aggregate;
pub mod entry;
pub mod pipeline;
pub mod recommendations;
pub mod rolling;
pub mod store;
pub mod streak;
pub mod summary;
pub mod types;

pub use aggregate::{DailyAggregator, DaySample, DaySeries};
pub use entry::{validate_entries, EntryValidationError, EntryValidationResult, LogEntryParser};
pub use pipeline::MetricAnalyzer;
pub use recommendations::{Priority, Recommendation, RecommendationCode, RecommendationEngine};
pub use rolling::{AnalyticsWindow, StabilityScore};
pub use store::{InMemoryLogStore, LogStore};
pub use streak::{compute_streak, StreakMachine, StreakState, StreakStatus};
pub use summary::{habit_streaks, HabitStreak, WellnessSummary};
pub use types::{DailyLogEntry, LogPayload, Metric, MetricAnalytics, MetricOverview};
