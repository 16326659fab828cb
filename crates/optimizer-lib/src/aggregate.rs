//! Report aggregation
//!
//! Runs every registered report module against the active account/region
//! scope and collects the per-report tables, presentation hints and savings
//! totals into the ordered result set the renderer consumes. Modules are
//! independent and execute concurrently; one failing module degrades to its
//! placeholder without touching its siblings.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::error::EngineError;
use crate::observability::EngineMetrics;
use crate::provider::ProviderClient;
use crate::report::{
    BackupCostReport, EbsRightsizingReport, GravitonReport, InstanceRightsizingReport,
    PresentationMetadata, RdsServerlessReport, Report, ReportTable, RunScope, SnapshotAuditReport,
};

/// One report's contribution to the run result
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput {
    pub name: String,
    pub title: String,
    pub table: ReportTable,
    pub presentation: PresentationMetadata,
    /// Whether the renderer shows the savings headline for this report
    pub display_savings: bool,
    /// Rounded sum of the table's savings column
    pub savings: f64,
}

/// Owns the report registry and drives one run at a time.
///
/// All run-scoped state lives in the [`RunScope`] handed to [`Aggregator::run`];
/// the aggregator itself holds nothing mutable between runs.
#[derive(Default)]
pub struct Aggregator {
    reports: Vec<Arc<dyn Report>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with every built-in report
    pub fn with_default_reports() -> Self {
        let mut aggregator = Self::new();
        aggregator.register(Arc::new(BackupCostReport));
        aggregator.register(Arc::new(SnapshotAuditReport));
        aggregator.register(Arc::new(InstanceRightsizingReport));
        aggregator.register(Arc::new(EbsRightsizingReport));
        aggregator.register(Arc::new(GravitonReport));
        aggregator.register(Arc::new(RdsServerlessReport));
        aggregator
    }

    pub fn register(&mut self, report: Arc<dyn Report>) {
        self.reports.push(report);
    }

    pub fn reports(&self) -> &[Arc<dyn Report>] {
        &self.reports
    }

    /// Run every registered report and collect the ordered result set.
    ///
    /// Parameter validation runs first so a bad tunable aborts before any
    /// external system is touched. Schema validation of each produced table
    /// fails the whole run loudly: a mismatch is a programming defect, not
    /// a data condition.
    pub async fn run(
        &self,
        client: Arc<dyn ProviderClient>,
        scope: &RunScope,
    ) -> Result<Vec<ReportOutput>, EngineError> {
        for report in &self.reports {
            scope.params.validate(&report.parameters())?;
        }

        let metrics = EngineMetrics::new();
        let mut tasks: JoinSet<(usize, ReportTable, f64)> = JoinSet::new();
        for (idx, report) in self.reports.iter().enumerate() {
            let report = report.clone();
            let client = client.clone();
            let scope = scope.clone();
            let metrics = metrics.clone();
            tasks.spawn(async move {
                let started = Instant::now();
                let table = report.collect_and_score(client, &scope).await;
                metrics.observe_report_duration(started.elapsed().as_secs_f64());
                metrics.add_rows_emitted(table.len() as u64);
                (idx, table, started.elapsed().as_secs_f64())
            });
        }

        let mut slots: Vec<Option<ReportOutput>> = Vec::new();
        slots.resize_with(self.reports.len(), || None);

        while let Some(joined) = tasks.join_next().await {
            let (idx, table, elapsed) = joined.map_err(|e| EngineError::TaskFailed {
                report: "unknown".to_string(),
                reason: e.to_string(),
            })?;
            let report = &self.reports[idx];

            validate_table(report.as_ref(), &table)?;

            let savings = report.estimated_savings(&table, true);
            metrics.inc_reports_completed();
            info!(
                report = report.name(),
                rows = table.len(),
                savings,
                elapsed_secs = elapsed,
                "report completed"
            );

            slots[idx] = Some(ReportOutput {
                name: report.name().to_string(),
                title: report.title().to_string(),
                table,
                presentation: report.presentation(),
                display_savings: report.display_savings(),
                savings,
            });
        }

        // Registration order, independent of completion order
        let outputs: Vec<ReportOutput> = slots.into_iter().flatten().collect();
        if outputs.len() != self.reports.len() {
            warn!(
                expected = self.reports.len(),
                produced = outputs.len(),
                "some report tasks produced no output"
            );
        }
        Ok(outputs)
    }
}

/// Check a produced table against the module's declared schema
fn validate_table(report: &dyn Report, table: &ReportTable) -> Result<(), EngineError> {
    if !report.validates_columns() {
        return Ok(());
    }
    let expected: Vec<String> = report
        .required_columns()
        .iter()
        .map(|c| c.to_string())
        .collect();
    if table.columns() != expected.as_slice() {
        return Err(EngineError::SchemaMismatch {
            report: report.name().to_string(),
            expected,
            actual: table.columns().to_vec(),
        });
    }
    for row in table.rows() {
        if row.len() != expected.len() {
            return Err(EngineError::RowShapeMismatch {
                report: report.name().to_string(),
                expected: expected.len(),
                actual: row.len(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_order() {
        let aggregator = Aggregator::with_default_reports();
        let names: Vec<&str> = aggregator.reports().iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec![
                "backup_cost",
                "snapshot_audit",
                "instance_rightsizing",
                "ebs_rightsizing",
                "graviton_migration",
                "rds_serverless",
            ]
        );
    }

    #[test]
    fn test_validate_table_accepts_matching_schema() {
        let report = BackupCostReport;
        let table = ReportTable::new(report.required_columns());
        assert!(validate_table(&report, &table).is_ok());
    }

    #[test]
    fn test_validate_table_rejects_renamed_column() {
        let report = BackupCostReport;
        let table = ReportTable::new(&["account", "resource_id"]);
        let err = validate_table(&report, &table).unwrap_err();
        assert!(matches!(err, EngineError::SchemaMismatch { .. }));
    }
}
