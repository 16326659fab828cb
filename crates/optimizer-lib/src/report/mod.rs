//! Report module contract
//!
//! Every analysis dimension implements the [`Report`] trait: pure metadata
//! accessors, a declared output schema, fixed presentation hints, and one
//! side-effecting collect-and-score operation. Modules are stateless trait
//! objects; everything per-run travels in the [`RunScope`].

mod backup_cost;
mod ebs_rightsizing;
mod graviton;
mod instance_rightsizing;
mod rds_serverless;
mod snapshot_audit;
mod table;

pub use backup_cost::BackupCostReport;
pub use ebs_rightsizing::EbsRightsizingReport;
pub use graviton::GravitonReport;
pub use instance_rightsizing::InstanceRightsizingReport;
pub use rds_serverless::RdsServerlessReport;
pub use snapshot_audit::SnapshotAuditReport;
pub use table::{round2, CellValue, ReportTable, SAVINGS_COLUMN};

use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::params::{ParameterSpec, ParameterStore};
use crate::pricing::PriceBook;
use crate::provider::ProviderClient;

/// Analysis domain a report belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Domain {
    Storage,
    Compute,
    Database,
}

impl Domain {
    pub fn label(&self) -> &'static str {
        match self {
            Domain::Storage => "STORAGE",
            Domain::Compute => "COMPUTE",
            Domain::Database => "DATABASE",
        }
    }
}

/// How the renderer should chart a report's table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartType {
    None,
    Chart,
    Pivot,
    Column,
}

/// Rectangular cell range in a rendered sheet.
///
/// Rows may be -1, meaning "through the last data row".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellRange {
    pub col_start: usize,
    pub row_start: i64,
    pub col_end: usize,
    pub row_end: i64,
}

impl CellRange {
    pub const fn new(col_start: usize, row_start: i64, col_end: usize, row_end: i64) -> Self {
        Self {
            col_start,
            row_start,
            col_end,
            row_end,
        }
    }
}

/// Static presentation hints for one report type.
///
/// Independent of row data except through declared column positions.
#[derive(Debug, Clone, Serialize)]
pub struct PresentationMetadata {
    pub chart_type: ChartType,
    pub category_range: CellRange,
    pub value_range: CellRange,
    /// Column indices the renderer formats as currency
    pub currency_columns: &'static [usize],
    /// Column indices the renderer groups chart data by
    pub group_by: &'static [usize],
}

/// Cooperative cancellation flag shared across a run.
///
/// Cancelling stops modules from issuing new external calls promptly;
/// in-flight calls are allowed to drain.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-run context handed to every report module.
///
/// Replaces any notion of shared process state: the aggregator owns one
/// scope per run and drops it when the run's results are handed off.
#[derive(Debug, Clone)]
pub struct RunScope {
    pub account: String,
    pub regions: Vec<String>,
    pub params: ParameterStore,
    pub prices: PriceBook,
    /// Budget for any single external call issued on behalf of one resource
    pub resource_timeout: Duration,
    pub cancel: CancelFlag,
}

impl RunScope {
    pub fn new(account: impl Into<String>, regions: Vec<String>) -> Self {
        Self {
            account: account.into(),
            regions,
            params: ParameterStore::new(),
            prices: PriceBook::default(),
            resource_timeout: Duration::from_secs(30),
            cancel: CancelFlag::new(),
        }
    }

    /// Region used for single-region operations.
    ///
    /// When several regions are configured only the first is consulted; a
    /// known simplification, not a multi-region fan-out.
    pub fn region(&self) -> &str {
        self.regions.first().map(String::as_str).unwrap_or_default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// The polymorphic unit of analysis.
///
/// A collection failure inside `collect_and_score` must be caught, logged
/// and degraded to the module's placeholder row; it never aborts sibling
/// modules. An empty result is one placeholder row, never zero rows, so the
/// renderer always has something to display.
#[async_trait]
pub trait Report: Send + Sync {
    /// Stable machine name
    fn name(&self) -> &'static str;

    /// Human-readable report title
    fn title(&self) -> &'static str;

    fn domain(&self) -> Domain;

    fn description(&self) -> &'static str;

    /// Documentation link shown alongside the report
    fn html_link(&self) -> &'static str {
        "#"
    }

    fn authors(&self) -> &'static [&'static str];

    /// Ordered schema the output table must satisfy
    fn required_columns(&self) -> &'static [&'static str];

    /// Whether the aggregator checks the produced columns against
    /// [`Report::required_columns`]; modules may opt out
    fn validates_columns(&self) -> bool {
        true
    }

    /// Whether the renderer shows this report's savings headline
    fn display_savings(&self) -> bool {
        true
    }

    /// Tunable parameters this report consumes
    fn parameters(&self) -> Vec<ParameterSpec> {
        Vec::new()
    }

    fn presentation(&self) -> PresentationMetadata;

    /// Collect raw records, classify and score them, and return the table.
    ///
    /// The only side-effecting operation on the contract.
    async fn collect_and_score(
        &self,
        client: Arc<dyn ProviderClient>,
        scope: &RunScope,
    ) -> ReportTable;

    /// Rounded sum of the table's savings column when `sum` is set;
    /// 0.0 otherwise, or when the table is empty or lacks the column
    fn estimated_savings(&self, table: &ReportTable, sum: bool) -> f64 {
        if sum {
            table.savings_sum()
        } else {
            0.0
        }
    }
}
