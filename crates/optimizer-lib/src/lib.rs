//! Report contract and savings-estimation engine
//!
//! This crate provides the core functionality for:
//! - Normalized resource, snapshot and metric data models
//! - Criticality classification from resource tags
//! - Tiered lifecycle backup cost modeling
//! - Workload pattern analysis and serverless suitability scoring
//! - The polymorphic report module contract and its six built-in reports
//! - Aggregation of report outputs for the renderer

pub mod aggregate;
pub mod classify;
pub mod error;
pub mod models;
pub mod observability;
pub mod params;
pub mod pricing;
pub mod provider;
pub mod report;
pub mod workload;

pub use aggregate::{Aggregator, ReportOutput};
pub use classify::{classify_criticality, CriticalityLevel};
pub use error::{EngineError, ProviderError};
pub use models::*;
pub use observability::EngineMetrics;
pub use params::{ParameterSpec, ParameterStore, LOOKBACK_PERIOD};
pub use pricing::{estimate_backup_cost, CostEstimate, PriceBook, ResourceKind, UnitPrices};
pub use report::{
    CancelFlag, CellValue, ChartType, Domain, PresentationMetadata, Report, ReportTable, RunScope,
    SAVINGS_COLUMN,
};
pub use workload::{analyze, Suitability, WorkloadAnalysis, WorkloadPattern};
