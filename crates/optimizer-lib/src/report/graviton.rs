//! Graviton migration report
//!
//! Instance recommendations constrained to the ARM64 architecture,
//! surfacing the cost of staying on the current CPU family.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::observability::EngineMetrics;
use crate::provider::{top_ranked, CpuArchitecture, ProviderClient};
use crate::report::{
    round2, CellRange, CellValue, ChartType, Domain, PresentationMetadata, Report, ReportTable,
    RunScope, SAVINGS_COLUMN,
};

const NAME: &str = "graviton_migration";

const COLUMNS: &[&str] = &[
    "account_id",
    "instance_arn",
    "instance_name",
    "current_instance_type",
    "finding",
    "number_of_recommendations",
    "recommended_instance_type",
    SAVINGS_COLUMN,
];

/// ARM64 migration opportunities from the provider's recommendation engine
pub struct GravitonReport;

impl GravitonReport {
    fn placeholder_row(&self, scope: &RunScope) -> Vec<CellValue> {
        vec![
            scope.account.as_str().into(),
            "".into(),
            "No recommendations available".into(),
            "".into(),
            "".into(),
            0i64.into(),
            "".into(),
            0.0.into(),
        ]
    }
}

#[async_trait]
impl Report for GravitonReport {
    fn name(&self) -> &'static str {
        NAME
    }

    fn title(&self) -> &'static str {
        "GRAVITON view"
    }

    fn domain(&self) -> Domain {
        Domain::Compute
    }

    fn description(&self) -> &'static str {
        "Instance recommendations for migration to ARM64 (Graviton) CPU families."
    }

    fn authors(&self) -> &'static [&'static str] {
        &["slepetre"]
    }

    fn required_columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    fn display_savings(&self) -> bool {
        false
    }

    fn presentation(&self) -> PresentationMetadata {
        PresentationMetadata {
            chart_type: ChartType::Chart,
            category_range: CellRange::new(1, 0, 1, 0),
            value_range: CellRange::new(7, 1, 7, -1),
            currency_columns: &[7],
            group_by: &[1, 2],
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

        let recommendations = match client
            .instance_recommendations(region, Some(CpuArchitecture::Arm64))
            .await
        {
            Ok(recommendations) => recommendations,
            Err(e) => {
                EngineMetrics::new().inc_collection_errors();
                warn!(report = NAME, error = %e, "ARM64 recommendations unavailable");
                table.push_row(self.placeholder_row(scope));
                return table;
            }
        };

        for recommendation in recommendations {
            if scope.is_cancelled() {
                break;
            }
            let top = top_ranked(&recommendation.options);
            if top.is_none() {
                debug!(
                    report = NAME,
                    instance = %recommendation.instance_name,
                    "no rank-1 option, treating savings as zero"
                );
            }

            table.push_row(vec![
                recommendation.account_id.as_str().into(),
                recommendation.instance_arn.as_str().into(),
                recommendation.instance_name.as_str().into(),
                recommendation.current_instance_type.as_str().into(),
                recommendation.finding.as_str().into(),
                (recommendation.options.len() as i64).into(),
                top.map(|o| o.instance_type.as_str()).unwrap_or_default().into(),
                round2(top.map(|o| o.monthly_savings).unwrap_or(0.0)).into(),
            ]);
        }

        if table.is_empty() {
            table.push_row(self.placeholder_row(scope));
        }
        table
    }
}
