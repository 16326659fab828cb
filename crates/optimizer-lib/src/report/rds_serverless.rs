//! RDS serverless suitability report
//!
//! Pulls per-instance utilization series over the configured lookback,
//! runs the workload pattern analyzer, and estimates what migrating
//! suitable instances to a serverless engine would save. Metric retrieval
//! dominates latency, so instances fan out over a bounded worker pool.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use crate::models::{MetricBundle, ResourceRecord};
use crate::observability::EngineMetrics;
use crate::params::{ParameterSpec, LOOKBACK_PERIOD};
use crate::provider::ProviderClient;
use crate::report::{
    round2, CellRange, CellValue, ChartType, Domain, PresentationMetadata, Report, ReportTable,
    RunScope, SAVINGS_COLUMN,
};
use crate::workload::{analyze, Suitability, WorkloadAnalysis, WorkloadPattern};

const NAME: &str = "rds_serverless";

/// Concurrent metric fetches in flight; the metric API is rate-limited
const MAX_CONCURRENT_FETCHES: usize = 4;

const COLUMNS: &[&str] = &[
    "account_id",
    "db_identifier",
    "engine",
    "instance_class",
    "workload_pattern",
    "spike_score",
    "serverless_suitability",
    "avg_cpu",
    "max_cpu",
    "cpu_std_dev",
    "spike_frequency_pct",
    "aurora_compatible",
    "migration_complexity",
    SAVINGS_COLUMN,
];

/// Approximate monthly on-demand cost by instance class
const INSTANCE_MONTHLY_COST: &[(&str, f64)] = &[
    ("db.t3.micro", 15.0),
    ("db.t3.small", 30.0),
    ("db.t3.medium", 60.0),
    ("db.t3.large", 120.0),
    ("db.t3.xlarge", 240.0),
    ("db.t3.2xlarge", 480.0),
    ("db.r5.large", 180.0),
    ("db.r5.xlarge", 360.0),
    ("db.r5.2xlarge", 720.0),
    ("db.r5.4xlarge", 1440.0),
    ("db.r5.8xlarge", 2880.0),
];

/// Fallback when an instance class is not in the cost table
const DEFAULT_MONTHLY_COST: f64 = 100.0;

/// Workload-pattern-driven serverless migration candidates
pub struct RdsServerlessReport;

/// Engine compatibility verdict: (aurora-native, migratable, complexity)
fn engine_compatibility(engine: &str) -> (bool, bool, &'static str) {
    match engine {
        "aurora-mysql" | "aurora-postgresql" => (true, true, "Low"),
        "mysql" | "postgres" => (false, true, "Medium"),
        _ => (false, false, "High"),
    }
}

fn monthly_cost(instance_class: &str) -> f64 {
    INSTANCE_MONTHLY_COST
        .iter()
        .find(|(class, _)| *class == instance_class)
        .map(|(_, cost)| *cost)
        .unwrap_or(DEFAULT_MONTHLY_COST)
}

/// Savings rate by suitability, with a bonus for very low utilization
fn serverless_savings(instance_class: &str, analysis: &WorkloadAnalysis) -> f64 {
    let mut rate = match analysis.suitability {
        Suitability::Excellent => 0.5,
        Suitability::Good => 0.35,
        Suitability::Fair => 0.2,
        _ => 0.05,
    };
    // Bonus for genuinely measured low utilization; degraded analyses
    // report avg 0 and must not qualify
    let measured = !matches!(
        analysis.pattern,
        WorkloadPattern::InsufficientData | WorkloadPattern::Unknown
    );
    if measured && analysis.avg < 15.0 {
        rate += 0.1;
    }
    round2(monthly_cost(instance_class) * rate)
}

impl RdsServerlessReport {
    fn placeholder_row(&self, scope: &RunScope) -> Vec<CellValue> {
        vec![
            scope.account.as_str().into(),
            "No suitable instances found".into(),
            "".into(),
            "".into(),
            "".into(),
            0.0.into(),
            "".into(),
            0.0.into(),
            0.0.into(),
            0.0.into(),
            0.0.into(),
            "".into(),
            "".into(),
            0.0.into(),
        ]
    }

    fn score_instance(
        &self,
        table: &mut ReportTable,
        instance: &ResourceRecord,
        metrics: &MetricBundle,
    ) {
        let engine = instance.engine.as_deref().unwrap_or_default();
        let instance_class = instance.instance_class.as_deref().unwrap_or_default();
        let (aurora_compatible, migratable, complexity) = engine_compatibility(engine);

        if !migratable {
            return;
        }

        let analysis = analyze(metrics);
        if analysis.suitability == Suitability::Poor {
            return;
        }

        let savings = serverless_savings(instance_class, &analysis);

        table.push_row(vec![
            instance.account_id.as_str().into(),
            instance.resource_id.as_str().into(),
            engine.into(),
            instance_class.into(),
            analysis.pattern.label().into(),
            round2(analysis.spike_score).into(),
            analysis.suitability.label().into(),
            round2(analysis.avg).into(),
            round2(analysis.max).into(),
            round2(analysis.std_dev).into(),
            round2(analysis.spike_frequency_pct).into(),
            (if aurora_compatible { "Yes" } else { "No" }).into(),
            complexity.into(),
            savings.into(),
        ]);
    }

    /// Fetch metric bundles for every instance with bounded concurrency.
    ///
    /// Results come back indexed to the enumeration order so repeated runs
    /// over the same inputs produce identical tables. A failed or timed-out
    /// fetch yields None for that instance only.
    async fn fetch_all_metrics(
        &self,
        client: Arc<dyn ProviderClient>,
        scope: &RunScope,
        instances: Vec<ResourceRecord>,
        lookback_days: u32,
    ) -> Vec<(ResourceRecord, Option<MetricBundle>)> {
        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_FETCHES));
        let mut tasks: JoinSet<(usize, ResourceRecord, Option<MetricBundle>)> = JoinSet::new();
        let total = instances.len();

        for (idx, instance) in instances.into_iter().enumerate() {
            if scope.is_cancelled() {
                break;
            }
            let semaphore = semaphore.clone();
            let client = client.clone();
            let cancel = scope.cancel.clone();
            let region = scope.region().to_string();
            let timeout = scope.resource_timeout;

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (idx, instance, None);
                };
                // Re-check after waiting on the pool: no new calls once
                // the run is cancelled, in-flight ones drain on their own
                if cancel.is_cancelled() {
                    return (idx, instance, None);
                }

                let fetch = client.metric_series(&region, &instance.resource_id, lookback_days);
                match tokio::time::timeout(timeout, fetch).await {
                    Ok(Ok(metrics)) => (idx, instance, Some(metrics)),
                    Ok(Err(e)) => {
                        EngineMetrics::new().inc_collection_errors();
                        warn!(
                            report = NAME,
                            db_identifier = %instance.resource_id,
                            error = %e,
                            "metric retrieval failed, skipping instance"
                        );
                        (idx, instance, None)
                    }
                    Err(_) => {
                        EngineMetrics::new().inc_collection_errors();
                        warn!(
                            report = NAME,
                            db_identifier = %instance.resource_id,
                            timeout_ms = timeout.as_millis() as u64,
                            "metric retrieval timed out, skipping instance"
                        );
                        (idx, instance, None)
                    }
                }
            });
        }

        let mut slots: Vec<Option<(ResourceRecord, Option<MetricBundle>)>> = Vec::new();
        slots.resize_with(total, || None);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, instance, metrics)) => slots[idx] = Some((instance, metrics)),
                Err(e) => warn!(report = NAME, error = %e, "metric fetch task failed"),
            }
        }
        slots.into_iter().flatten().collect()
    }
}

#[async_trait]
impl Report for RdsServerlessReport {
    fn name(&self) -> &'static str {
        NAME
    }

    fn title(&self) -> &'static str {
        "RDS SERVERLESS OPTIMIZATION"
    }

    fn domain(&self) -> Domain {
        Domain::Database
    }

    fn description(&self) -> &'static str {
        "Database instances whose workload pattern suits serverless migration."
    }

    fn html_link(&self) -> &'static str {
        "https://docs.aws.amazon.com/AmazonRDS/latest/AuroraUserGuide/aurora-serverless-v2.html"
    }

    fn authors(&self) -> &'static [&'static str] {
        &["slepetre"]
    }

    fn required_columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![LOOKBACK_PERIOD]
    }

    fn presentation(&self) -> PresentationMetadata {
        PresentationMetadata {
            chart_type: ChartType::Column,
            category_range: CellRange::new(2, 0, 2, 0),
            value_range: CellRange::new(13, 1, 13, -1),
            currency_columns: &[13],
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
        let lookback_days = scope.params.resolve_u32(&LOOKBACK_PERIOD);

        let instances = match client.list_db_instances(scope.region()).await {
            Ok(instances) => instances,
            Err(e) => {
                EngineMetrics::new().inc_collection_errors();
                warn!(report = NAME, error = %e, "database enumeration failed");
                table.push_row(self.placeholder_row(scope));
                return table;
            }
        };

        let scored = self
            .fetch_all_metrics(client, scope, instances, lookback_days)
            .await;
        for (instance, metrics) in &scored {
            if let Some(metrics) = metrics {
                self.score_instance(&mut table, instance, metrics);
            }
        }

        if table.is_empty() {
            table.push_row(self.placeholder_row(scope));
        }
        table
    }
}
