//! Volume rightsizing report
//!
//! Provider rightsizing recommendations for block-storage volumes, with
//! the current configuration carried alongside the top-ranked option's
//! savings.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::observability::EngineMetrics;
use crate::provider::{top_ranked, ProviderClient};
use crate::report::{
    round2, CellRange, CellValue, ChartType, Domain, PresentationMetadata, Report, ReportTable,
    RunScope, SAVINGS_COLUMN,
};

const NAME: &str = "ebs_rightsizing";

const COLUMNS: &[&str] = &[
    "account_id",
    "volume_arn",
    "current_volume_type",
    "current_volume_size",
    "root_volume",
    "finding",
    "number_of_recommendations",
    SAVINGS_COLUMN,
];

/// Provider rightsizing findings for block-storage volumes
pub struct EbsRightsizingReport;

impl EbsRightsizingReport {
    fn placeholder_row(&self, scope: &RunScope) -> Vec<CellValue> {
        vec![
            scope.account.as_str().into(),
            "No recommendations available".into(),
            "".into(),
            0.0.into(),
            "".into(),
            "".into(),
            0i64.into(),
            0.0.into(),
        ]
    }
}

#[async_trait]
impl Report for EbsRightsizingReport {
    fn name(&self) -> &'static str {
        NAME
    }

    fn title(&self) -> &'static str {
        "EC2 EBS COSTS view"
    }

    fn domain(&self) -> Domain {
        Domain::Storage
    }

    fn description(&self) -> &'static str {
        "Provider rightsizing recommendations for block-storage volumes."
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
            chart_type: ChartType::Pivot,
            category_range: CellRange::new(2, 0, 3, 0),
            value_range: CellRange::new(7, 1, 7, -1),
            currency_columns: &[7],
            group_by: &[0, 1],
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

        let recommendations = match client.volume_recommendations(region).await {
            Ok(recommendations) => recommendations,
            Err(e) => {
                EngineMetrics::new().inc_collection_errors();
                warn!(report = NAME, error = %e, "volume recommendations unavailable");
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
                    volume = %recommendation.volume_arn,
                    "no rank-1 option, treating savings as zero"
                );
            }
            let savings = top.map(|o| o.monthly_savings).unwrap_or(0.0);

            table.push_row(vec![
                recommendation.account_id.as_str().into(),
                recommendation.volume_arn.as_str().into(),
                recommendation.current_volume_type.as_str().into(),
                recommendation.current_size_gb.into(),
                recommendation.root_volume.into(),
                recommendation.finding.as_str().into(),
                (recommendation.options.len() as i64).into(),
                round2(savings).into(),
            ]);
        }

        if table.is_empty() {
            table.push_row(self.placeholder_row(scope));
        }
        table
    }
}
