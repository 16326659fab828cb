//! Backup cost optimization report
//!
//! Flags in-use volumes and available database instances whose
//! snapshot-based backups would be cheaper under criticality-matched
//! tiered retention than under the uniform daily-snapshot scheme.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::classify::classify_criticality;
use crate::models::{ResourceRecord, ResourceType};
use crate::observability::EngineMetrics;
use crate::pricing::{estimate_backup_cost, CostEstimate, ResourceKind, UnitPrices};
use crate::provider::ProviderClient;
use crate::report::{
    round2, CellRange, ChartType, Domain, PresentationMetadata, Report, ReportTable, RunScope,
    SAVINGS_COLUMN,
};

const NAME: &str = "backup_cost";

const COLUMNS: &[&str] = &[
    "account_id",
    "resource_id",
    "resource_type",
    "criticality_level",
    "current_backup_cost",
    "optimized_backup_cost",
    "retention_policy",
    "backup_frequency",
    "lifecycle_transition",
    "cross_region_needed",
    "security_compliance",
    SAVINGS_COLUMN,
];

/// Tiered backup retention recommendations for volumes and databases
pub struct BackupCostReport;

impl BackupCostReport {
    fn score_resources(
        &self,
        table: &mut ReportTable,
        resources: &[ResourceRecord],
        active_state: &str,
        kind: ResourceKind,
        prices: &UnitPrices,
        scope: &RunScope,
    ) {
        for resource in resources.iter().filter(|r| r.state == active_state) {
            if scope.is_cancelled() {
                break;
            }
            let criticality = classify_criticality(&resource.tags);
            let estimate = estimate_backup_cost(resource.size_gb, kind, criticality, prices);

            // Zero and negative savings are dropped, never reported as
            // regressions; revisit if cost-increase visibility is wanted.
            if !estimate.reportable() {
                continue;
            }
            table.push_row(row(resource, criticality, &estimate));
        }
    }

    fn placeholder_row(&self, scope: &RunScope) -> Vec<crate::report::CellValue> {
        vec![
            scope.account.as_str().into(),
            "All backups already optimized".into(),
            "".into(),
            "".into(),
            0.0.into(),
            0.0.into(),
            "".into(),
            "".into(),
            "".into(),
            "".into(),
            "".into(),
            0.0.into(),
        ]
    }
}

fn row(
    resource: &ResourceRecord,
    criticality: crate::classify::CriticalityLevel,
    estimate: &CostEstimate,
) -> Vec<crate::report::CellValue> {
    vec![
        resource.account_id.as_str().into(),
        resource.resource_id.as_str().into(),
        resource.resource_type.label().into(),
        criticality.label().into(),
        round2(estimate.current_cost).into(),
        round2(estimate.optimized_cost).into(),
        estimate.retention_policy.into(),
        estimate.frequency.into(),
        estimate.lifecycle_transition.into(),
        (if criticality.needs_cross_region() { "Yes" } else { "No" }).into(),
        criticality.compliance_label().into(),
        round2(estimate.savings()).into(),
    ]
}

#[async_trait]
impl Report for BackupCostReport {
    fn name(&self) -> &'static str {
        NAME
    }

    fn title(&self) -> &'static str {
        "BACKUP COST OPTIMIZATION"
    }

    fn domain(&self) -> Domain {
        Domain::Storage
    }

    fn description(&self) -> &'static str {
        "Cost-optimized backup recommendations with security-first retention policies."
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
            currency_columns: &[4, 5, 11],
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
        let ebs_prices = scope.prices.resolve(ResourceKind::Ebs);
        let rds_prices = scope.prices.resolve(ResourceKind::Rds);

        match client.list_volumes(region).await {
            Ok(volumes) => {
                debug_assert!(volumes
                    .iter()
                    .all(|v| v.resource_type == ResourceType::Volume));
                self.score_resources(&mut table, &volumes, "in-use", ResourceKind::Ebs, &ebs_prices, scope);
            }
            Err(e) => {
                EngineMetrics::new().inc_collection_errors();
                warn!(report = NAME, error = %e, "volume enumeration failed");
            }
        }

        match client.list_db_instances(region).await {
            Ok(instances) => {
                self.score_resources(
                    &mut table,
                    &instances,
                    "available",
                    ResourceKind::Rds,
                    &rds_prices,
                    scope,
                );
            }
            Err(e) => {
                EngineMetrics::new().inc_collection_errors();
                warn!(report = NAME, error = %e, "database enumeration failed");
            }
        }

        if table.is_empty() {
            table.push_row(self.placeholder_row(scope));
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tag;

    fn resource(id: &str, size_gb: f64, tags: Vec<Tag>) -> ResourceRecord {
        ResourceRecord {
            account_id: "123456789012".into(),
            resource_id: id.into(),
            resource_type: ResourceType::Volume,
            size_gb,
            state: "in-use".into(),
            tags,
            engine: None,
            instance_class: None,
        }
    }

    #[test]
    fn test_standard_volume_row_retained() {
        let mut table = ReportTable::new(COLUMNS);
        let report = BackupCostReport;
        let scope = RunScope::new("123456789012", vec!["eu-west-1".into()]);
        let resources = vec![resource("vol-1", 100.0, vec![])];

        report.score_resources(
            &mut table,
            &resources,
            "in-use",
            ResourceKind::Ebs,
            &UnitPrices::ebs_defaults(),
            &scope,
        );

        assert_eq!(table.len(), 1);
        // 100 GB Standard EBS: current 150.0, optimized 35.0, savings 115.0
        assert_eq!(table.savings_sum(), 115.0);
        let retention_idx = table.column_index("retention_policy").unwrap();
        assert_eq!(table.rows()[0][retention_idx].to_string(), "7d hot only");
    }

    #[test]
    fn test_critical_volume_row_dropped() {
        let mut table = ReportTable::new(COLUMNS);
        let report = BackupCostReport;
        let scope = RunScope::new("123456789012", vec!["eu-west-1".into()]);
        // Critical retention costs more than the daily-snapshot baseline at
        // default rates (savings -39.55), so the row never surfaces
        let resources = vec![resource(
            "vol-2",
            100.0,
            vec![Tag::new("environment", "prod")],
        )];

        report.score_resources(
            &mut table,
            &resources,
            "in-use",
            ResourceKind::Ebs,
            &UnitPrices::ebs_defaults(),
            &scope,
        );

        assert!(table.is_empty());
    }

    #[test]
    fn test_inactive_resources_skipped() {
        let mut table = ReportTable::new(COLUMNS);
        let report = BackupCostReport;
        let scope = RunScope::new("123456789012", vec!["eu-west-1".into()]);
        let mut detached = resource("vol-3", 50.0, vec![]);
        detached.state = "available".into();

        report.score_resources(
            &mut table,
            &[detached],
            "in-use",
            ResourceKind::Ebs,
            &UnitPrices::ebs_defaults(),
            &scope,
        );

        assert!(table.is_empty());
    }

    #[test]
    fn test_placeholder_matches_schema() {
        let report = BackupCostReport;
        let scope = RunScope::new("123456789012", vec![]);
        assert_eq!(report.placeholder_row(&scope).len(), COLUMNS.len());
    }
}
