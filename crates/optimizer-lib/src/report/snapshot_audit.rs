//! Manual snapshot audit report
//!
//! Surfaces volume and database snapshots created outside the managed
//! backup service. The savings figure is the snapshot's monthly storage
//! cost, recoverable by migrating it under managed retention.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

use crate::classify::{created_by, is_backup_managed};
use crate::models::SnapshotRecord;
use crate::observability::EngineMetrics;
use crate::pricing::ResourceKind;
use crate::provider::ProviderClient;
use crate::report::{
    round2, CellRange, CellValue, ChartType, Domain, PresentationMetadata, Report, ReportTable,
    RunScope, SAVINGS_COLUMN,
};

const NAME: &str = "snapshot_audit";

const COLUMNS: &[&str] = &[
    "account_id",
    "snapshot_id",
    "snapshot_type",
    "resource_id",
    "creation_date",
    "size_gb",
    "age_days",
    "created_by",
    "description",
    SAVINGS_COLUMN,
];

/// Audit of snapshots living outside managed backup governance
pub struct SnapshotAuditReport;

impl SnapshotAuditReport {
    fn score_snapshots(
        &self,
        table: &mut ReportTable,
        snapshots: &[SnapshotRecord],
        kind: ResourceKind,
        scope: &RunScope,
    ) {
        let rate = scope.prices.resolve(kind).standard;
        for snapshot in snapshots {
            if scope.is_cancelled() {
                break;
            }
            if is_backup_managed(&snapshot.tags) {
                continue;
            }
            let age_days = (Utc::now() - snapshot.created_at).num_days().max(0);
            let monthly_cost = snapshot.size_gb * rate;

            table.push_row(vec![
                snapshot.account_id.as_str().into(),
                snapshot.snapshot_id.as_str().into(),
                snapshot.kind.label().into(),
                snapshot.source_resource_id.as_str().into(),
                snapshot.created_at.format("%Y-%m-%d").to_string().into(),
                snapshot.size_gb.into(),
                age_days.into(),
                created_by(&snapshot.tags).into(),
                snapshot.description.as_str().into(),
                round2(monthly_cost).into(),
            ]);
        }
    }

    fn placeholder_row(&self, scope: &RunScope) -> Vec<CellValue> {
        vec![
            scope.account.as_str().into(),
            "No manual snapshots found".into(),
            "".into(),
            "".into(),
            "".into(),
            0.0.into(),
            0i64.into(),
            "".into(),
            "".into(),
            0.0.into(),
        ]
    }
}

#[async_trait]
impl Report for SnapshotAuditReport {
    fn name(&self) -> &'static str {
        NAME
    }

    fn title(&self) -> &'static str {
        "MANUAL SNAPSHOTS ANALYSIS"
    }

    fn domain(&self) -> Domain {
        Domain::Storage
    }

    fn description(&self) -> &'static str {
        "Volume and database snapshots created outside the managed backup service."
    }

    fn html_link(&self) -> &'static str {
        "https://docs.aws.amazon.com/aws-backup/latest/devguide/whatisbackup.html"
    }

    fn authors(&self) -> &'static [&'static str] {
        &["slepetre"]
    }

    fn required_columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    fn presentation(&self) -> PresentationMetadata {
        PresentationMetadata {
            chart_type: ChartType::Column,
            category_range: CellRange::new(2, 0, 2, 0),
            value_range: CellRange::new(9, 1, 9, -1),
            currency_columns: &[9],
            group_by: &[2],
        }
    }

    async fn collect_and_score(
        &self,
        client: Arc<dyn ProviderClient>,
        scope: &RunScope,
    ) -> ReportTable {
        let mut table = ReportTable::new(COLUMNS);
        if scope.is_cancelled() {
            table.push_row(self.placeholder_row(scope));
            return table;
        }
        let region = scope.region();

        match client.list_volume_snapshots(region).await {
            Ok(snapshots) => self.score_snapshots(&mut table, &snapshots, ResourceKind::Ebs, scope),
            Err(e) => {
                EngineMetrics::new().inc_collection_errors();
                warn!(report = NAME, error = %e, "volume snapshot enumeration failed");
            }
        }

        match client.list_db_snapshots(region).await {
            Ok(snapshots) => self.score_snapshots(&mut table, &snapshots, ResourceKind::Rds, scope),
            Err(e) => {
                EngineMetrics::new().inc_collection_errors();
                warn!(report = NAME, error = %e, "database snapshot enumeration failed");
            }
        }

        if table.is_empty() {
            table.push_row(self.placeholder_row(scope));
        }
        table
    }
}
