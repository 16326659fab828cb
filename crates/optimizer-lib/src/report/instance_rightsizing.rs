//! Instance rightsizing report
//!
//! Carries the provider's instance rightsizing recommendations into the
//! result set. Savings come from the top-ranked option only; an absent
//! rank-1 option means zero savings for that instance.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::observability::EngineMetrics;
use crate::params::{ParameterSpec, LOOKBACK_PERIOD};
use crate::provider::{region_of_arn, top_ranked, ProviderClient};
use crate::report::{
    round2, CellRange, CellValue, ChartType, Domain, PresentationMetadata, Report, ReportTable,
    RunScope, SAVINGS_COLUMN,
};

const NAME: &str = "instance_rightsizing";

const COLUMNS: &[&str] = &[
    "account_id",
    "region",
    "instance_name",
    "current_instance_type",
    "finding",
    "recommended_instance_type",
    "migration_effort",
    "platform_details",
    SAVINGS_COLUMN,
];

/// Provider rightsizing findings for compute instances
pub struct InstanceRightsizingReport;

impl InstanceRightsizingReport {
    fn placeholder_row(&self, scope: &RunScope) -> Vec<CellValue> {
        vec![
            scope.account.as_str().into(),
            scope.region().into(),
            "No recommendations available".into(),
            "".into(),
            "".into(),
            "".into(),
            "".into(),
            "".into(),
            0.0.into(),
        ]
    }
}

#[async_trait]
impl Report for InstanceRightsizingReport {
    fn name(&self) -> &'static str {
        NAME
    }

    fn title(&self) -> &'static str {
        "COMPUTE OPTIMIZER view"
    }

    fn domain(&self) -> Domain {
        Domain::Compute
    }

    fn description(&self) -> &'static str {
        "Provider rightsizing recommendations for compute instances."
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

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![LOOKBACK_PERIOD]
    }

    fn presentation(&self) -> PresentationMetadata {
        PresentationMetadata {
            chart_type: ChartType::Pivot,
            category_range: CellRange::new(1, 4, 1, 4),
            value_range: CellRange::new(8, 1, 8, -1),
            currency_columns: &[8],
            group_by: &[1],
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

        let recommendations = match client.instance_recommendations(region, None).await {
            Ok(recommendations) => recommendations,
            Err(e) => {
                EngineMetrics::new().inc_collection_errors();
                warn!(report = NAME, error = %e, "instance recommendations unavailable");
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
            let recommended_type = top.map(|o| o.instance_type.as_str()).unwrap_or_default();
            let savings = top.map(|o| o.monthly_savings).unwrap_or(0.0);
            let migration_effort = top
                .and_then(|o| o.migration_effort.as_deref())
                .unwrap_or("N/A");

            table.push_row(vec![
                recommendation.account_id.as_str().into(),
                region_of_arn(&recommendation.instance_arn)
                    .unwrap_or(region)
                    .into(),
                recommendation.instance_name.as_str().into(),
                recommendation.current_instance_type.as_str().into(),
                recommendation.finding.as_str().into(),
                recommended_type.into(),
                migration_effort.into(),
                recommendation.platform.as_deref().unwrap_or("Unknown").into(),
                round2(savings).into(),
            ]);
        }

        if table.is_empty() {
            table.push_row(self.placeholder_row(scope));
        }
        table
    }
}
