//! Workload pattern analysis
//!
//! Scores how bursty a resource's utilization is from its metric time
//! series and maps the score to a serverless/elastic-scaling suitability
//! verdict through an ordered decision table.

use serde::{Deserialize, Serialize};

use crate::models::{MetricBundle, MetricSeries};

/// Primary utilization series the analysis is built on
pub const PRIMARY_METRIC: &str = "CPUUtilization";

/// Secondary activity series contributing weighted score terms when present
pub const SECONDARY_METRICS: &[&str] = &["ReadIOPS", "WriteIOPS", "DatabaseConnections"];

/// Free-memory series feeding the memory-pressure score term
pub const MEMORY_METRIC: &str = "FreeableMemory";

/// Minimum average-value samples required for a meaningful analysis
pub const MIN_SAMPLES: usize = 10;

/// Average utilization below which a workload counts as low-utilization
const LOW_UTILIZATION_THRESHOLD: f64 = 20.0;

/// Secondary-activity ceilings for the "everything is quiet" upgrade
const LOW_IOPS_THRESHOLD: f64 = 100.0;
const LOW_CONNECTIONS_THRESHOLD: f64 = 10.0;

/// Detected utilization shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkloadPattern {
    HighlySpiky,
    ModeratelySpiky,
    LowUtilization,
    Variable,
    Steady,
    InsufficientData,
    Unknown,
}

impl WorkloadPattern {
    pub fn label(&self) -> &'static str {
        match self {
            WorkloadPattern::HighlySpiky => "Highly Spiky",
            WorkloadPattern::ModeratelySpiky => "Moderately Spiky",
            WorkloadPattern::LowUtilization => "Low Utilization",
            WorkloadPattern::Variable => "Variable",
            WorkloadPattern::Steady => "Steady",
            WorkloadPattern::InsufficientData => "Insufficient Data",
            WorkloadPattern::Unknown => "Unknown",
        }
    }
}

/// Qualitative verdict on whether a workload benefits from elastic scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Suitability {
    Excellent,
    Good,
    Fair,
    Poor,
    Low,
    Unknown,
}

impl Suitability {
    pub fn label(&self) -> &'static str {
        match self {
            Suitability::Excellent => "Excellent",
            Suitability::Good => "Good",
            Suitability::Fair => "Fair",
            Suitability::Poor => "Poor",
            Suitability::Low => "Low",
            Suitability::Unknown => "Unknown",
        }
    }
}

/// Result of analyzing one resource's metric bundle.
///
/// `std_dev` is the sample standard deviation (Bessel's correction) of the
/// primary average-value series; every consumer of this type relies on that
/// flavor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadAnalysis {
    pub pattern: WorkloadPattern,
    /// Composite burstiness score, clamped to [0, 100]
    pub spike_score: f64,
    pub suitability: Suitability,
    pub avg: f64,
    pub max: f64,
    pub std_dev: f64,
    /// Percentage of max-value samples exceeding twice the average
    pub spike_frequency_pct: f64,
    pub variability_coefficient: f64,
}

impl WorkloadAnalysis {
    fn degraded(pattern: WorkloadPattern, suitability: Suitability) -> Self {
        Self {
            pattern,
            spike_score: 0.0,
            suitability,
            avg: 0.0,
            max: 0.0,
            std_dev: 0.0,
            spike_frequency_pct: 0.0,
            variability_coefficient: 0.0,
        }
    }
}

/// Analyze a metric bundle and produce a workload verdict.
///
/// Requires the primary series with at least [`MIN_SAMPLES`] average
/// samples; degrades to Unknown / InsufficientData otherwise instead of
/// failing.
pub fn analyze(metrics: &MetricBundle) -> WorkloadAnalysis {
    let primary = match metrics.get(PRIMARY_METRIC) {
        Some(series) => series,
        None => return WorkloadAnalysis::degraded(WorkloadPattern::Unknown, Suitability::Low),
    };

    if primary.avg.len() < MIN_SAMPLES {
        return WorkloadAnalysis::degraded(WorkloadPattern::InsufficientData, Suitability::Unknown);
    }

    let avg = primary.mean();
    let max = primary
        .max
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max)
        .max(0.0);
    let std_dev = sample_std_dev(&primary.avg);
    let variability_coefficient = if avg > 0.0 { std_dev / avg } else { 0.0 };
    let spike_freq = spike_frequency(primary);

    let mut score =
        variability_coefficient * 30.0 + spike_freq * 40.0 + ((max - avg) / 10.0).max(0.0);

    // Secondary activity series each add a smaller weighted term
    for name in SECONDARY_METRICS {
        if let Some(series) = metrics.get(*name) {
            if series.avg.is_empty() {
                continue;
            }
            let mean = series.mean();
            let variability = if mean > 0.0 {
                sample_std_dev(&series.avg) / mean
            } else {
                0.0
            };
            score += variability * 5.0 + spike_frequency(series) * 10.0;
        }
    }

    score += memory_pressure_term(metrics.get(MEMORY_METRIC));

    let spike_score = score.clamp(0.0, 100.0);

    // Ordered decision table; bands overlap, so the priority order below is
    // part of the contract.
    let (pattern, suitability) = if spike_score > 60.0 {
        (WorkloadPattern::HighlySpiky, Suitability::Excellent)
    } else if spike_score > 40.0 {
        (WorkloadPattern::ModeratelySpiky, Suitability::Good)
    } else if avg < LOW_UTILIZATION_THRESHOLD {
        let suitability = if secondary_activity_low(metrics) {
            Suitability::Excellent
        } else {
            Suitability::Good
        };
        (WorkloadPattern::LowUtilization, suitability)
    } else if variability_coefficient > 0.5 {
        (WorkloadPattern::Variable, Suitability::Fair)
    } else {
        (WorkloadPattern::Steady, Suitability::Poor)
    };

    WorkloadAnalysis {
        pattern,
        spike_score,
        suitability,
        avg,
        max,
        std_dev,
        spike_frequency_pct: spike_freq * 100.0,
        variability_coefficient,
    }
}

/// Fraction of max-value samples exceeding twice the series average
fn spike_frequency(series: &MetricSeries) -> f64 {
    if series.max.is_empty() {
        return 0.0;
    }
    let threshold = series.mean() * 2.0;
    let spikes = series.max.iter().filter(|v| **v > threshold).count();
    spikes as f64 / series.max.len() as f64
}

/// Up to 10 extra points when observed free memory dips well below its mean
fn memory_pressure_term(memory: Option<&MetricSeries>) -> f64 {
    let Some(series) = memory else { return 0.0 };
    if series.avg.is_empty() {
        return 0.0;
    }
    let avg_free = series.mean();
    if avg_free <= 0.0 {
        return 0.0;
    }
    let min_free = series
        .min
        .iter()
        .chain(series.avg.iter())
        .copied()
        .fold(f64::INFINITY, f64::min);
    (10.0 * (avg_free - min_free) / avg_free).clamp(0.0, 10.0)
}

/// Whether every present secondary series shows low activity
fn secondary_activity_low(metrics: &MetricBundle) -> bool {
    let quiet = |name: &str, threshold: f64| {
        metrics
            .get(name)
            .map(|s| s.avg.is_empty() || s.mean() < threshold)
            .unwrap_or(true)
    };
    quiet("ReadIOPS", LOW_IOPS_THRESHOLD)
        && quiet("WriteIOPS", LOW_IOPS_THRESHOLD)
        && quiet("DatabaseConnections", LOW_CONNECTIONS_THRESHOLD)
}

/// Sample standard deviation (Bessel's correction); 0.0 below two samples
fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values
        .iter()
        .map(|v| (v - mean).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn bundle(series: &[(&str, MetricSeries)]) -> MetricBundle {
        series
            .iter()
            .map(|(name, s)| (name.to_string(), s.clone()))
            .collect()
    }

    fn flat_series(value: f64, count: usize) -> MetricSeries {
        MetricSeries {
            avg: vec![value; count],
            max: vec![value; count],
            min: vec![value; count],
        }
    }

    #[test]
    fn test_missing_primary_is_unknown() {
        let analysis = analyze(&HashMap::new());
        assert_eq!(analysis.pattern, WorkloadPattern::Unknown);
        assert_eq!(analysis.suitability, Suitability::Low);
        assert_eq!(analysis.spike_score, 0.0);
    }

    #[test]
    fn test_insufficient_samples() {
        let metrics = bundle(&[(PRIMARY_METRIC, flat_series(95.0, 9))]);
        let analysis = analyze(&metrics);
        assert_eq!(analysis.pattern, WorkloadPattern::InsufficientData);
        assert_eq!(analysis.suitability, Suitability::Unknown);
        assert_eq!(analysis.spike_score, 0.0);
    }

    #[test]
    fn test_low_utilization_series() {
        // Mean 10, one mild excursion; well under every spike band
        let mut series = flat_series(10.0, 20);
        series.max[3] = 15.0;
        let metrics = bundle(&[(PRIMARY_METRIC, series)]);

        let analysis = analyze(&metrics);
        assert_eq!(analysis.pattern, WorkloadPattern::LowUtilization);
        // No secondary series present, so quiet-secondary upgrade applies
        assert_eq!(analysis.suitability, Suitability::Excellent);
        assert!((analysis.avg - 10.0).abs() < 1e-9);
        assert!(analysis.spike_score < 40.0);
    }

    #[test]
    fn test_low_utilization_with_busy_secondary_is_good() {
        let metrics = bundle(&[
            (PRIMARY_METRIC, flat_series(10.0, 20)),
            ("ReadIOPS", flat_series(500.0, 20)),
        ]);
        let analysis = analyze(&metrics);
        assert_eq!(analysis.pattern, WorkloadPattern::LowUtilization);
        assert_eq!(analysis.suitability, Suitability::Good);
    }

    #[test]
    fn test_spike_score_clamped_at_saturation() {
        // Mostly-zero series with huge excursions drives both the
        // variability and magnitude terms far past 100
        let mut avg = vec![0.1; 30];
        avg[29] = 100.0;
        let max = vec![100.0; 30];
        let series = MetricSeries {
            avg,
            max,
            min: vec![0.0; 30],
        };
        let metrics = bundle(&[(PRIMARY_METRIC, series)]);

        let analysis = analyze(&metrics);
        assert_eq!(analysis.spike_score, 100.0);
        assert_eq!(analysis.pattern, WorkloadPattern::HighlySpiky);
        assert_eq!(analysis.suitability, Suitability::Excellent);
    }

    #[test]
    fn test_steady_high_utilization_is_poor() {
        let metrics = bundle(&[(PRIMARY_METRIC, flat_series(65.0, 24))]);
        let analysis = analyze(&metrics);
        assert_eq!(analysis.pattern, WorkloadPattern::Steady);
        assert_eq!(analysis.suitability, Suitability::Poor);
        assert_eq!(analysis.spike_frequency_pct, 0.0);
    }

    #[test]
    fn test_variable_band() {
        // Mean 40 with wide swings: variability > 0.5 but score under 40
        // and avg above the low-utilization threshold
        let avg: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 10.0 } else { 70.0 }).collect();
        let series = MetricSeries {
            max: vec![70.0; 20],
            min: vec![10.0; 20],
            avg,
        };
        let metrics = bundle(&[(PRIMARY_METRIC, series)]);

        let analysis = analyze(&metrics);
        assert!(analysis.variability_coefficient > 0.5);
        assert_eq!(analysis.pattern, WorkloadPattern::Variable);
        assert_eq!(analysis.suitability, Suitability::Fair);
    }

    #[test]
    fn test_memory_pressure_adds_points() {
        let primary = flat_series(65.0, 24);
        let memory = MetricSeries {
            avg: vec![8_000_000_000.0; 24],
            max: vec![8_000_000_000.0; 24],
            min: vec![500_000_000.0; 24],
        };
        let without = analyze(&bundle(&[(PRIMARY_METRIC, primary.clone())]));
        let with = analyze(&bundle(&[
            (PRIMARY_METRIC, primary),
            (MEMORY_METRIC, memory),
        ]));
        assert!(with.spike_score > without.spike_score);
        assert!(with.spike_score - without.spike_score <= 10.0 + 1e-9);
    }

    #[test]
    fn test_sample_std_dev() {
        // Values 1..=5: sample variance 2.5
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((sample_std_dev(&values) - 2.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(sample_std_dev(&[3.0]), 0.0);
        assert_eq!(sample_std_dev(&[]), 0.0);
    }
}
