//! Core data models for the cost optimizer engine
//!
//! These are immutable snapshots of provider state at collection time,
//! produced by external collectors and consumed read-only by the reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single resource tag.
///
/// Tags are kept as an ordered list rather than a map: criticality
/// classification is first-match-wins over the provider's tag order, and
/// that order must survive normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Kind of cloud resource a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceType {
    Volume,
    DbInstance,
}

impl ResourceType {
    /// Human-readable label used in report tables
    pub fn label(&self) -> &'static str {
        match self {
            ResourceType::Volume => "EBS Volume",
            ResourceType::DbInstance => "RDS Instance",
        }
    }
}

/// Normalized view of one cloud resource plus its tags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub account_id: String,
    pub resource_id: String,
    pub resource_type: ResourceType,
    /// Allocated storage in GiB
    pub size_gb: f64,
    /// Provider lifecycle state ("in-use", "available", ...)
    pub state: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Database engine, present for DbInstance records
    #[serde(default)]
    pub engine: Option<String>,
    /// Instance class, present for DbInstance records
    #[serde(default)]
    pub instance_class: Option<String>,
}

/// Kind of snapshot a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotKind {
    Ebs,
    Rds,
}

impl SnapshotKind {
    pub fn label(&self) -> &'static str {
        match self {
            SnapshotKind::Ebs => "EBS",
            SnapshotKind::Rds => "RDS",
        }
    }
}

/// A point-in-time snapshot of a volume or database instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub account_id: String,
    pub snapshot_id: String,
    pub kind: SnapshotKind,
    /// The volume or database the snapshot was taken from
    pub source_resource_id: String,
    pub created_at: DateTime<Utc>,
    pub size_gb: f64,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub description: String,
}

/// One named utilization time series with per-interval statistics
///
/// The three vectors are parallel: element `i` of each holds the average,
/// maximum and minimum observed during sample interval `i`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricSeries {
    pub avg: Vec<f64>,
    pub max: Vec<f64>,
    pub min: Vec<f64>,
}

impl MetricSeries {
    /// Mean of the average-value samples, 0.0 when empty
    pub fn mean(&self) -> f64 {
        if self.avg.is_empty() {
            return 0.0;
        }
        self.avg.iter().sum::<f64>() / self.avg.len() as f64
    }
}

/// Metric series bundle keyed by metric name (e.g. "CPUUtilization")
pub type MetricBundle = HashMap<String, MetricSeries>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_labels() {
        assert_eq!(ResourceType::Volume.label(), "EBS Volume");
        assert_eq!(ResourceType::DbInstance.label(), "RDS Instance");
    }

    #[test]
    fn test_metric_series_mean() {
        let series = MetricSeries {
            avg: vec![10.0, 20.0, 30.0],
            max: vec![],
            min: vec![],
        };
        assert!((series.mean() - 20.0).abs() < f64::EPSILON);
        assert_eq!(MetricSeries::default().mean(), 0.0);
    }

    #[test]
    fn test_tag_order_survives_serde() {
        let record = ResourceRecord {
            account_id: "123".into(),
            resource_id: "vol-1".into(),
            resource_type: ResourceType::Volume,
            size_gb: 100.0,
            state: "in-use".into(),
            tags: vec![Tag::new("environment", "prod"), Tag::new("tier", "test")],
            engine: None,
            instance_class: None,
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: ResourceRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tags[0].key, "environment");
        assert_eq!(back.tags[1].key, "tier");
    }
}
