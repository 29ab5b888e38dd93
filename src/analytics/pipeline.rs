//! Metric analytics orchestration
//!
//! Entries → daily aggregation → streak / rolling average / stability →
//! recommendations. Everything is recomputed from the supplied slice; no
//! state survives between calls.

use super::aggregate::DailyAggregator;
use super::recommendations::RecommendationEngine;
use super::rolling::{mean, AnalyticsWindow, StabilityScore};
use super::streak::compute_streak;
use super::types::{DailyLogEntry, Metric, MetricAnalytics, MetricOverview};
use crate::config::AnalyticsConfig;
use crate::error::EngineError;
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Long-horizon window used by [`MetricAnalyzer::overview`]
pub const OVERVIEW_LONG_WINDOW_DAYS: u32 = 90;

/// Analytics calculator for daily log metrics
#[derive(Debug, Clone, Default)]
pub struct MetricAnalyzer {
    config: AnalyticsConfig,
}

impl MetricAnalyzer {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Window of `window_days` ending at `as_of`, bounded by the configured maximum
    pub fn window(&self, as_of: NaiveDate, window_days: u32) -> Result<AnalyticsWindow, EngineError> {
        if window_days > self.config.max_window_days {
            return Err(EngineError::InvalidWindow(format!(
                "window of {} days exceeds the maximum of {}",
                window_days, self.config.max_window_days
            )));
        }
        AnalyticsWindow::ending_at(as_of, window_days)
    }

    /// Compute streak, rolling statistics and recommendations for one metric
    pub fn analyze(
        &self,
        entries: &[DailyLogEntry],
        metric: Metric,
        as_of: NaiveDate,
        window_days: u32,
    ) -> Result<MetricAnalytics, EngineError> {
        let window = self.window(as_of, window_days)?;
        self.analyze_window(entries, metric, window)
    }

    /// Compute analytics over an explicit window; the streak is taken at `window.end`
    pub fn analyze_window(
        &self,
        entries: &[DailyLogEntry],
        metric: Metric,
        window: AnalyticsWindow,
    ) -> Result<MetricAnalytics, EngineError> {
        if window.days() > self.config.max_window_days {
            return Err(EngineError::InvalidWindow(format!(
                "window {}..{} exceeds the maximum of {} days",
                window.start, window.end, self.config.max_window_days
            )));
        }
        for (index, entry) in entries.iter().enumerate().filter(|(_, e)| e.metric() == metric) {
            entry
                .validate()
                .map_err(|e| EngineError::InvalidEntry(format!("entry {}: {}", index, e)))?;
        }

        let as_of = window.end;
        let days = DailyAggregator::aggregate(entries, metric, as_of);
        let streak = compute_streak(&days, metric, as_of, self.config.pending_today_grace);

        let samples: Vec<_> = window.samples(&days).collect();
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        let qualities: Vec<f64> = samples.iter().filter_map(|s| s.quality_percent).collect();

        let stability = StabilityScore::from_values(
            &values,
            self.config.stability_caps.for_metric(metric),
            self.config.min_reliable_samples,
        );
        if !stability.reliable {
            warn!(
                metric = metric.as_str(),
                samples = values.len(),
                "sparse data; stability score is not reliable"
            );
        }

        let mut analytics = MetricAnalytics {
            metric,
            as_of,
            window,
            streak,
            rolling_average: mean(&values),
            window_total: values.iter().sum(),
            days_logged: values.len(),
            qualifying_days: samples.iter().filter(|s| s.qualifies).count(),
            stability,
            sleep_quality_average: if metric == Metric::Sleep { mean(&qualities) } else { None },
            recommendations: Vec::new(),
        };
        analytics.recommendations =
            RecommendationEngine::derive(&analytics, self.config.min_reliable_samples);

        debug!(
            metric = metric.as_str(),
            %as_of,
            current_streak = analytics.streak.current_streak,
            longest_streak = analytics.streak.longest_streak,
            average = ?analytics.rolling_average,
            stability = analytics.stability.score,
            "metric analytics computed"
        );
        Ok(analytics)
    }

    /// 7-day (configured default) and 90-day analytics in one call
    pub fn overview(
        &self,
        entries: &[DailyLogEntry],
        metric: Metric,
        as_of: NaiveDate,
    ) -> Result<MetricOverview, EngineError> {
        Ok(MetricOverview {
            metric,
            seven_day: self.analyze(entries, metric, as_of, self.config.default_window_days)?,
            ninety_day: self.analyze(entries, metric, as_of, OVERVIEW_LONG_WINDOW_DAYS)?,
        })
    }
}
