//! Advisory recommendations
//!
//! A small rule table over computed statistics. The output is display
//! content for the host UI and carries no statistical guarantee.

use super::streak::StreakStatus;
use super::types::{Metric, MetricAnalytics};
use serde::{Deserialize, Serialize};

/// Stable identifier for each rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCode {
    LogMoreConsistently,
    IncreaseSleep,
    KeepSleepSchedule,
    ImproveSleepQuality,
    SupportLowMood,
    SteadyMood,
    FocusOnFewerHabits,
    ExtendMeditation,
    DrinkMoreWater,
    MoveMore,
    TrainMoreOften,
    ReduceSugar,
    RestartStreak,
    CelebrateStreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub code: RecommendationCode,
    pub priority: Priority,
    pub title: String,
    pub message: String,
}

impl Recommendation {
    fn new(code: RecommendationCode, priority: Priority, title: &str, message: String) -> Self {
        Self {
            code,
            priority,
            title: title.to_string(),
            message,
        }
    }
}

/// Rule thresholds
const MIN_SLEEP_HOURS: f64 = 7.0;
const MIN_SLEEP_QUALITY: f64 = 70.0;
const MIN_MOOD: f64 = 3.0;
const MIN_STABILITY: u8 = 50;
const MIN_HABIT_RATE: f64 = 0.5;
const MIN_MEDITATION_MINUTES: f64 = 5.0;
const MIN_WATER_ML: f64 = 2000.0;
const MIN_STEPS: f64 = 7000.0;
const MIN_WORKOUTS_PER_WEEK: f64 = 3.0;
const CELEBRATE_STREAK_DAYS: u32 = 7;
const RESTART_STREAK_DAYS: u32 = 3;

/// Rule-table evaluator
pub struct RecommendationEngine;

impl RecommendationEngine {
    /// Derive recommendations, highest priority first.
    ///
    /// With fewer than `min_samples` logged days only the "log more" and
    /// streak rules fire; score-based advice is withheld.
    pub fn derive(analytics: &MetricAnalytics, min_samples: usize) -> Vec<Recommendation> {
        let mut out = Vec::new();
        let sparse = analytics.days_logged < min_samples;

        if sparse {
            out.push(Recommendation::new(
                RecommendationCode::LogMoreConsistently,
                Priority::Medium,
                "Log more consistently",
                format!(
                    "Only {} of the last {} days have {} entries. A few more days of logging will make these insights meaningful.",
                    analytics.days_logged,
                    analytics.window.days(),
                    analytics.metric.as_str().replace('_', " ")
                ),
            ));
        } else {
            Self::metric_rules(analytics, &mut out);
        }

        Self::streak_rules(analytics, &mut out);
        out.sort_by_key(|r| r.priority);
        out
    }

    fn metric_rules(a: &MetricAnalytics, out: &mut Vec<Recommendation>) {
        let average = a.rolling_average.unwrap_or(0.0);
        let steady = !a.stability.reliable || a.stability.score >= MIN_STABILITY;

        match a.metric {
            Metric::Sleep => {
                if average < MIN_SLEEP_HOURS {
                    out.push(Recommendation::new(
                        RecommendationCode::IncreaseSleep,
                        Priority::High,
                        "Increase sleep",
                        format!(
                            "You're averaging {:.1} hours. Aim for at least {} hours a night.",
                            average, MIN_SLEEP_HOURS
                        ),
                    ));
                }
                if !steady {
                    out.push(Recommendation::new(
                        RecommendationCode::KeepSleepSchedule,
                        Priority::Medium,
                        "Keep a regular schedule",
                        format!(
                            "Your sleep varies by {:.1} hours night to night. Consistent bed and wake times help.",
                            a.stability.std_dev
                        ),
                    ));
                }
                if let Some(quality) = a.sleep_quality_average {
                    if quality < MIN_SLEEP_QUALITY {
                        out.push(Recommendation::new(
                            RecommendationCode::ImproveSleepQuality,
                            Priority::Medium,
                            "Improve sleep quality",
                            format!(
                                "Average sleep quality is {:.0}%. Try a darker, cooler room and no screens before bed.",
                                quality
                            ),
                        ));
                    }
                }
            }
            Metric::Mood => {
                if average < MIN_MOOD {
                    out.push(Recommendation::new(
                        RecommendationCode::SupportLowMood,
                        Priority::High,
                        "Look after your mood",
                        format!(
                            "Your mood has averaged {:.1} out of 5. Reach out to someone you trust or try a short walk outside.",
                            average
                        ),
                    ));
                }
                if !steady {
                    out.push(Recommendation::new(
                        RecommendationCode::SteadyMood,
                        Priority::Low,
                        "Notice mood swings",
                        "Your mood has been up and down. Journaling can help spot what drives it.".to_string(),
                    ));
                }
            }
            Metric::Habit => {
                let rate = a.qualifying_days as f64 / f64::from(a.window.days().max(1));
                if rate < MIN_HABIT_RATE {
                    out.push(Recommendation::new(
                        RecommendationCode::FocusOnFewerHabits,
                        Priority::Medium,
                        "Focus on fewer habits",
                        format!(
                            "You completed habits on {:.0}% of days. Pick one or two to build momentum.",
                            rate * 100.0
                        ),
                    ));
                }
            }
            Metric::Meditation => {
                if average < MIN_MEDITATION_MINUTES {
                    out.push(Recommendation::new(
                        RecommendationCode::ExtendMeditation,
                        Priority::Low,
                        "Extend your sessions",
                        format!(
                            "Sessions average {:.0} minutes. Building up to {} minutes makes practice easier to feel.",
                            average, MIN_MEDITATION_MINUTES
                        ),
                    ));
                }
            }
            Metric::Water => {
                if average < MIN_WATER_ML {
                    out.push(Recommendation::new(
                        RecommendationCode::DrinkMoreWater,
                        Priority::Medium,
                        "Drink more water",
                        format!(
                            "You're averaging {:.0} ml a day. Keep a bottle nearby and aim for {:.0} ml.",
                            average, MIN_WATER_ML
                        ),
                    ));
                }
            }
            Metric::Steps => {
                if average < MIN_STEPS {
                    out.push(Recommendation::new(
                        RecommendationCode::MoveMore,
                        Priority::Medium,
                        "Move more",
                        format!(
                            "You're averaging {:.0} steps. A 15 minute walk adds roughly 2000.",
                            average
                        ),
                    ));
                }
            }
            Metric::Workout => {
                let per_week = a.qualifying_days as f64 * 7.0 / f64::from(a.window.days().max(1));
                if per_week < MIN_WORKOUTS_PER_WEEK {
                    out.push(Recommendation::new(
                        RecommendationCode::TrainMoreOften,
                        Priority::Medium,
                        "Train more often",
                        format!(
                            "About {:.1} workouts a week so far. Three sessions a week is a solid base.",
                            per_week
                        ),
                    ));
                }
            }
            Metric::SugarControl => {
                let rate = a.qualifying_days as f64 / a.days_logged.max(1) as f64;
                if rate < 0.5 {
                    out.push(Recommendation::new(
                        RecommendationCode::ReduceSugar,
                        Priority::Medium,
                        "Cut back on added sugar",
                        format!(
                            "{:.0}% of logged days were sugar-free. Swap one sugary snack a day for fruit.",
                            rate * 100.0
                        ),
                    ));
                }
            }
            Metric::Reflection => {}
        }
    }

    fn streak_rules(a: &MetricAnalytics, out: &mut Vec<Recommendation>) {
        let streak = &a.streak;
        if streak.current_streak >= CELEBRATE_STREAK_DAYS {
            out.push(Recommendation::new(
                RecommendationCode::CelebrateStreak,
                Priority::Low,
                "Keep it going",
                format!("{} days in a row. Nice work.", streak.current_streak),
            ));
        } else if streak.status == StreakStatus::Broken && streak.longest_streak >= RESTART_STREAK_DAYS {
            out.push(Recommendation::new(
                RecommendationCode::RestartStreak,
                Priority::Low,
                "Start a new streak",
                format!(
                    "Your best run was {} days. Today is a good day to start again.",
                    streak.longest_streak
                ),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::rolling::{AnalyticsWindow, StabilityScore};
    use crate::analytics::streak::StreakState;
    use chrono::NaiveDate;

    fn analytics(metric: Metric, days_logged: usize, average: f64) -> MetricAnalytics {
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        MetricAnalytics {
            metric,
            as_of,
            window: AnalyticsWindow::ending_at(as_of, 7).unwrap(),
            streak: StreakState {
                metric,
                current_streak: 0,
                longest_streak: 0,
                last_qualifying_date: None,
                status: StreakStatus::NoHistory,
            },
            rolling_average: Some(average),
            window_total: average * days_logged as f64,
            days_logged,
            qualifying_days: days_logged,
            stability: StabilityScore {
                score: 90,
                std_dev: 0.2,
                sample_count: days_logged,
                reliable: days_logged >= 3,
            },
            sleep_quality_average: None,
            recommendations: Vec::new(),
        }
    }

    fn codes(recs: &[Recommendation]) -> Vec<RecommendationCode> {
        recs.iter().map(|r| r.code).collect()
    }

    #[test]
    fn test_short_sleep() {
        let recs = RecommendationEngine::derive(&analytics(Metric::Sleep, 7, 6.2), 3);
        assert_eq!(codes(&recs), vec![RecommendationCode::IncreaseSleep]);
        assert_eq!(recs[0].priority, Priority::High);
    }

    #[test]
    fn test_sparse_data_withholds_score_advice() {
        let recs = RecommendationEngine::derive(&analytics(Metric::Sleep, 1, 5.0), 3);
        assert_eq!(codes(&recs), vec![RecommendationCode::LogMoreConsistently]);
    }

    #[test]
    fn test_irregular_sleep() {
        let mut a = analytics(Metric::Sleep, 7, 7.5);
        a.stability.score = 20;
        a.stability.std_dev = 1.6;
        a.sleep_quality_average = Some(60.0);
        let recs = RecommendationEngine::derive(&a, 3);
        assert_eq!(
            codes(&recs),
            vec![
                RecommendationCode::KeepSleepSchedule,
                RecommendationCode::ImproveSleepQuality
            ]
        );
    }

    #[test]
    fn test_low_mood_is_high_priority() {
        let mut a = analytics(Metric::Mood, 5, 2.4);
        a.stability.score = 30;
        let recs = RecommendationEngine::derive(&a, 3);
        assert_eq!(recs[0].code, RecommendationCode::SupportLowMood);
        assert_eq!(recs.last().unwrap().code, RecommendationCode::SteadyMood);
    }

    #[test]
    fn test_streak_rules() {
        let mut a = analytics(Metric::Habit, 7, 1.0);
        a.streak.current_streak = 9;
        a.streak.longest_streak = 9;
        a.streak.status = StreakStatus::Active { length: 9 };
        let recs = RecommendationEngine::derive(&a, 3);
        assert_eq!(codes(&recs), vec![RecommendationCode::CelebrateStreak]);

        a.streak.current_streak = 0;
        a.streak.status = StreakStatus::Broken;
        let recs = RecommendationEngine::derive(&a, 3);
        assert_eq!(codes(&recs), vec![RecommendationCode::RestartStreak]);
    }

    #[test]
    fn test_habit_rate() {
        let mut a = analytics(Metric::Habit, 4, 0.5);
        a.qualifying_days = 2;
        let recs = RecommendationEngine::derive(&a, 3);
        assert_eq!(codes(&recs), vec![RecommendationCode::FocusOnFewerHabits]);
    }

    #[test]
    fn test_healthy_steps_produce_nothing() {
        let recs = RecommendationEngine::derive(&analytics(Metric::Steps, 7, 9500.0), 3);
        assert!(recs.is_empty());
    }
}
