//! Rolling windows, averages and variability
//!
//! Averages are taken over days that have entries, never over calendar days,
//! so gaps in logging do not drag a metric toward zero.

use super::aggregate::{DaySample, DaySeries};
use crate::error::EngineError;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive calendar window ending at an as-of date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AnalyticsWindow {
    /// Window of `days` calendar days ending on `as_of`
    pub fn ending_at(as_of: NaiveDate, days: u32) -> Result<Self, EngineError> {
        if days == 0 {
            return Err(EngineError::InvalidWindow("window must cover at least one day".into()));
        }
        Ok(Self {
            start: as_of - Duration::days(i64::from(days) - 1),
            end: as_of,
        })
    }

    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, EngineError> {
        if start > end {
            return Err(EngineError::InvalidWindow(format!(
                "window start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn days(&self) -> u32 {
        ((self.end - self.start).num_days() + 1) as u32
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Samples that fall inside the window, oldest first
    pub fn samples<'a>(&self, days: &'a DaySeries) -> impl Iterator<Item = &'a DaySample> {
        days.range(self.start..=self.end).map(|(_, sample)| sample)
    }
}

/// Mean of the given values, `None` when empty
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation; 0 for fewer than two values
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Rolling average over the days in the window that have entries
pub fn rolling_average(days: &DaySeries, window: &AnalyticsWindow) -> Option<f64> {
    let values: Vec<f64> = window.samples(days).map(|s| s.value).collect();
    mean(&values)
}

/// Consistency score derived from day-to-day variability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityScore {
    /// 0-100, higher is steadier
    pub score: u8,
    pub std_dev: f64,
    pub sample_count: usize,
    /// False when fewer samples than the configured minimum were available
    pub reliable: bool,
}

impl StabilityScore {
    /// `round((1 - min(σ, cap) / cap) × 100)` clamped to 0-100.
    ///
    /// Zero or one sample yields σ = 0 and a score of 100, flagged unreliable.
    pub fn from_values(values: &[f64], cap: f64, min_samples: usize) -> Self {
        let std_dev = population_std_dev(values);
        let ratio = if cap > 0.0 { std_dev.min(cap) / cap } else { 0.0 };
        let score = ((1.0 - ratio) * 100.0).round().clamp(0.0, 100.0) as u8;

        Self {
            score,
            std_dev,
            sample_count: values.len(),
            reliable: values.len() >= min_samples.max(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(values: &[(&str, f64)]) -> DaySeries {
        values
            .iter()
            .map(|(d, v)| {
                let date = date(d);
                (
                    date,
                    DaySample {
                        date,
                        value: *v,
                        qualifies: true,
                        entry_count: 1,
                        quality_percent: None,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_window_bounds() {
        let window = AnalyticsWindow::ending_at(date("2024-01-07"), 7).unwrap();
        assert_eq!(window.start, date("2024-01-01"));
        assert_eq!(window.days(), 7);
        assert!(window.contains(date("2024-01-01")));
        assert!(!window.contains(date("2024-01-08")));
    }

    #[test]
    fn test_invalid_windows() {
        assert!(matches!(
            AnalyticsWindow::ending_at(date("2024-01-07"), 0),
            Err(EngineError::InvalidWindow(_))
        ));
        assert!(AnalyticsWindow::new(date("2024-01-07"), date("2024-01-01")).is_err());
    }

    #[test]
    fn test_average_over_logged_days_only() {
        let days = series(&[("2024-01-02", 6.0), ("2024-01-05", 8.0)]);
        let window = AnalyticsWindow::ending_at(date("2024-01-07"), 7).unwrap();
        let avg = rolling_average(&days, &window).unwrap();
        assert!((avg - 7.0).abs() < 0.001);
    }

    #[test]
    fn test_average_excludes_outside_window() {
        let days = series(&[("2023-12-20", 100.0), ("2024-01-05", 8.0)]);
        let window = AnalyticsWindow::ending_at(date("2024-01-07"), 7).unwrap();
        assert_eq!(rolling_average(&days, &window), Some(8.0));
    }

    #[test]
    fn test_empty_window_average() {
        let window = AnalyticsWindow::ending_at(date("2024-01-07"), 7).unwrap();
        assert_eq!(rolling_average(&DaySeries::new(), &window), None);
    }

    #[test]
    fn test_population_std_dev() {
        assert_eq!(population_std_dev(&[]), 0.0);
        assert_eq!(population_std_dev(&[4.0]), 0.0);
        let sd = population_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((sd - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_constant_mood_is_fully_stable() {
        let score = StabilityScore::from_values(&[4.0; 7], 2.0, 3);
        assert_eq!(score.score, 100);
        assert!(score.reliable);
    }

    #[test]
    fn test_volatile_mood_hits_zero() {
        let score = StabilityScore::from_values(&[1.0, 5.0, 1.0, 5.0], 2.0, 3);
        assert_eq!(score.score, 0);
    }

    #[test]
    fn test_single_sample_is_unreliable() {
        let score = StabilityScore::from_values(&[3.0], 2.0, 3);
        assert_eq!(score.score, 100);
        assert!(!score.reliable);
    }

    #[test]
    fn test_partial_stability() {
        // σ = 1 with cap 2 → 50
        let score = StabilityScore::from_values(&[2.0, 4.0], 2.0, 2);
        assert_eq!(score.score, 50);
    }
}
