//! Wellness plan: sleep, meditation and habits

use super::catalog::{HabitArchetype, HabitCategory};
use super::{tiebreak_keys, PlanWarning};
use crate::config::PlanConfig;
use crate::profile::{StressLevel, UserProfile};
use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

const WELLNESS_SALT: u64 = 0x7765_6c6c;

pub const BASE_SLEEP_HOURS: f64 = 8.0;
pub const STRESS_SLEEP_BONUS_HOURS: f64 = 0.5;
/// Width of the bedtime window (minutes)
pub const BEDTIME_WINDOW_MINUTES: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedtimeWindow {
    pub earliest: NaiveTime,
    pub latest: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepRecommendation {
    pub target_hours: f64,
    pub bedtime_window: BedtimeWindow,
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeditationStyle {
    Mindfulness,
    Guided,
    Breathing,
    BodyScan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeditationRecommendation {
    pub frequency_per_week: u8,
    pub session_minutes: u32,
    pub style: MeditationStyle,
}

impl MeditationRecommendation {
    pub fn for_stress(stress: StressLevel) -> Self {
        let (frequency_per_week, session_minutes, style) = match stress {
            StressLevel::Low => (3, 5, MeditationStyle::Mindfulness),
            StressLevel::Moderate => (5, 10, MeditationStyle::Guided),
            StressLevel::High => (6, 12, MeditationStyle::Breathing),
            StressLevel::VeryHigh => (7, 15, MeditationStyle::BodyScan),
        };
        Self {
            frequency_per_week,
            session_minutes,
            style,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedHabit {
    pub habit_id: String,
    pub name: String,
    pub icon: String,
    pub category: HabitCategory,
    /// "daily" or "N× per week"
    pub frequency: String,
    /// Keyword matches against the profile
    pub relevance: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessPlan {
    pub sleep: SleepRecommendation,
    pub meditation: MeditationRecommendation,
    pub habits: Vec<RecommendedHabit>,
}

/// Sleep target for a stress level
pub fn sleep_target_hours(stress: StressLevel) -> f64 {
    if stress.is_elevated() {
        BASE_SLEEP_HOURS + STRESS_SLEEP_BONUS_HOURS
    } else {
        BASE_SLEEP_HOURS
    }
}

/// `[wake − target − 30 min, wake − target]`, wrapping past midnight
pub fn bedtime_window(wake: NaiveTime, target_hours: f64) -> BedtimeWindow {
    let latest = wake - Duration::minutes((target_hours * 60.0).round() as i64);
    BedtimeWindow {
        earliest: latest - Duration::minutes(BEDTIME_WINDOW_MINUTES),
        latest,
    }
}

pub fn frequency_label(days_per_week: u8) -> String {
    if days_per_week >= 7 {
        "daily".to_string()
    } else {
        format!("{}× per week", days_per_week)
    }
}

pub(crate) fn build(
    config: &PlanConfig,
    profile: &UserProfile,
    habits: &[HabitArchetype],
    seed: u64,
) -> (WellnessPlan, Vec<PlanWarning>) {
    let target_hours = sleep_target_hours(profile.stress_level);
    let sleep = SleepRecommendation {
        target_hours,
        bedtime_window: bedtime_window(config.wake_time, target_hours),
        tips: sleep_tips(profile, target_hours),
    };

    let ranked = rank_habits(profile, habits, seed, config.habit_count);
    let mut warnings = Vec::new();
    if ranked.len() < config.habit_count {
        warnings.push(PlanWarning::InsufficientHabits {
            found: ranked.len(),
            required: config.habit_count,
        });
    }

    let plan = WellnessPlan {
        sleep,
        meditation: MeditationRecommendation::for_stress(profile.stress_level),
        habits: ranked,
    };
    (plan, warnings)
}

fn mentions(profile: &UserProfile, word: &str) -> bool {
    profile
        .challenges
        .iter()
        .chain(&profile.motivations)
        .any(|s| s.to_ascii_lowercase().contains(word))
}

fn sleep_tips(profile: &UserProfile, target_hours: f64) -> Vec<String> {
    let mut tips = Vec::new();
    let gap = target_hours - profile.sleep_hours;

    if gap >= 1.0 {
        tips.push(format!(
            "You're about {:.1} hours short of your target. Move bedtime 15 minutes earlier every few nights.",
            gap
        ));
    } else if profile.sleep_hours > target_hours + 1.5 {
        tips.push("Long nights can hide poor sleep quality. Keep a fixed wake time and see how you feel.".to_string());
    }
    if profile.stress_level.is_elevated() {
        tips.push("Wind down with 10 minutes of slow breathing or journaling before bed.".to_string());
    }
    if mentions(profile, "time") {
        tips.push("Treat bedtime like an appointment and set a reminder 30 minutes before.".to_string());
    }
    if mentions(profile, "consistency") {
        tips.push("Keep the same wake time on weekends.".to_string());
    }
    tips.push("Keep your bedroom dark and cool, and put screens away an hour before bed.".to_string());
    tips
}

fn rank_habits(
    profile: &UserProfile,
    habits: &[HabitArchetype],
    seed: u64,
    count: usize,
) -> Vec<RecommendedHabit> {
    let keys = tiebreak_keys(seed, WELLNESS_SALT, habits.len());
    let mut scored: Vec<(u32, u64, &HabitArchetype)> = habits
        .iter()
        .zip(keys)
        .map(|(habit, key)| {
            let mut relevance = habit
                .keywords
                .iter()
                .filter(|k| mentions(profile, &k.to_ascii_lowercase()))
                .count() as u32;
            if habit.category == HabitCategory::Mindfulness && profile.stress_level.is_elevated() {
                relevance += 1;
            }
            (relevance, key, habit)
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    scored
        .into_iter()
        .take(count)
        .map(|(relevance, _, habit)| RecommendedHabit {
            habit_id: habit.id.clone(),
            name: habit.name.clone(),
            icon: habit.icon.clone(),
            category: habit.category,
            frequency: frequency_label(habit.target_days_per_week),
            relevance,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::catalog::Catalog;
    use crate::profile::tests::sample_profile;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_sleep_target_by_stress() {
        assert_eq!(sleep_target_hours(StressLevel::Low), 8.0);
        assert_eq!(sleep_target_hours(StressLevel::Moderate), 8.0);
        assert_eq!(sleep_target_hours(StressLevel::High), 8.5);
        assert_eq!(sleep_target_hours(StressLevel::VeryHigh), 8.5);
    }

    #[test]
    fn test_bedtime_window_wraps_midnight() {
        let window = bedtime_window(time(6, 30), 8.0);
        assert_eq!(window.latest, time(22, 30));
        assert_eq!(window.earliest, time(22, 0));

        let window = bedtime_window(time(6, 0), 8.5);
        assert_eq!(window.latest, time(21, 30));
    }

    #[test]
    fn test_meditation_table() {
        let low = MeditationRecommendation::for_stress(StressLevel::Low);
        assert_eq!((low.frequency_per_week, low.session_minutes), (3, 5));
        let very_high = MeditationRecommendation::for_stress(StressLevel::VeryHigh);
        assert_eq!((very_high.frequency_per_week, very_high.session_minutes), (7, 15));
        assert_eq!(very_high.style, MeditationStyle::BodyScan);
    }

    #[test]
    fn test_frequency_label() {
        assert_eq!(frequency_label(7), "daily");
        assert_eq!(frequency_label(3), "3× per week");
    }

    #[test]
    fn test_habits_ranked_by_profile() {
        let mut profile = sample_profile();
        profile.motivations = vec!["Knowledge".into()];
        profile.challenges = vec!["Social Support".into()];
        let (plan, warnings) = build(&PlanConfig::default(), &profile, &Catalog::builtin().habits, 4);

        assert!(warnings.is_empty());
        assert_eq!(plan.habits.len(), 5);
        let top: Vec<_> = plan.habits.iter().take(2).map(|h| h.habit_id.as_str()).collect();
        assert!(top.contains(&"read-30"));
        assert!(top.contains(&"connect"));
    }

    #[test]
    fn test_stress_boosts_mindfulness() {
        let mut profile = sample_profile();
        profile.motivations.clear();
        profile.challenges.clear();
        profile.stress_level = StressLevel::VeryHigh;
        let (plan, _) = build(&PlanConfig::default(), &profile, &Catalog::builtin().habits, 4);

        let top: Vec<_> = plan.habits.iter().take(2).map(|h| h.category).collect();
        assert_eq!(top, vec![HabitCategory::Mindfulness, HabitCategory::Mindfulness]);
        assert_eq!(plan.sleep.target_hours, 8.5);
        assert!(plan.sleep.tips.iter().any(|t| t.contains("breathing")));
    }

    #[test]
    fn test_short_sleeper_gets_gap_tip() {
        let mut profile = sample_profile();
        profile.sleep_hours = 5.5;
        let (plan, _) = build(&PlanConfig::default(), &profile, &Catalog::builtin().habits, 4);
        assert!(plan.sleep.tips[0].contains("2.5 hours short"));
    }

    #[test]
    fn test_too_few_habits_warns() {
        let habits = Catalog::builtin().habits.into_iter().take(2).collect::<Vec<_>>();
        let (plan, warnings) = build(&PlanConfig::default(), &sample_profile(), &habits, 4);
        assert_eq!(plan.habits.len(), 2);
        assert_eq!(
            warnings,
            vec![PlanWarning::InsufficientHabits { found: 2, required: 5 }]
        );
    }
}
