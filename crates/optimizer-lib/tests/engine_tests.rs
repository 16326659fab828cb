//! Engine integration tests
//!
//! Exercise the aggregator and the built-in reports against a mock
//! provider client, covering ordering, partial failure degradation,
//! idempotence, schema validation, parameter validation and cancellation.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use optimizer_lib::aggregate::Aggregator;
use optimizer_lib::error::{EngineError, ProviderError};
use optimizer_lib::models::{
    MetricBundle, MetricSeries, ResourceRecord, ResourceType, SnapshotKind, SnapshotRecord, Tag,
};
use optimizer_lib::provider::{
    CpuArchitecture, InstanceOption, InstanceRecommendation, ProviderClient, VolumeOption,
    VolumeRecommendation,
};
use optimizer_lib::report::{
    CellRange, ChartType, Domain, PresentationMetadata, Report, ReportTable, RunScope,
};

/// Mock provider with canned data and per-operation call counters
#[derive(Default)]
struct MockProvider {
    fail_all: bool,
    fail_volumes: bool,
    volumes: Vec<ResourceRecord>,
    db_instances: Vec<ResourceRecord>,
    volume_snapshots: Vec<SnapshotRecord>,
    db_snapshots: Vec<SnapshotRecord>,
    metrics: HashMap<String, MetricBundle>,
    instance_recommendations: Vec<InstanceRecommendation>,
    arm_recommendations: Vec<InstanceRecommendation>,
    volume_recommendations: Vec<VolumeRecommendation>,
    total_calls: AtomicUsize,
    metric_calls: AtomicUsize,
}

impl MockProvider {
    fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    fn with_fixture_data() -> Self {
        let mut metrics = HashMap::new();
        metrics.insert("orders-db".to_string(), low_cpu_bundle());

        Self {
            volumes: vec![
                volume("vol-1", 100.0, vec![]),
                volume("vol-2", 100.0, vec![Tag::new("environment", "prod")]),
            ],
            db_instances: vec![db_instance("orders-db", "mysql", "db.t3.large", 50.0)],
            volume_snapshots: vec![
                snapshot("snap-1", vec![Tag::new("CreatedBy", "ops")]),
                snapshot("snap-2", vec![Tag::new("aws:backup:source-resource", "vol-1")]),
            ],
            db_snapshots: vec![],
            metrics,
            instance_recommendations: vec![instance_recommendation(
                "i-web-1",
                "m5.xlarge",
                "m5.large",
                42.0,
            )],
            arm_recommendations: vec![instance_recommendation(
                "i-web-1",
                "m5.xlarge",
                "m7g.large",
                55.5,
            )],
            volume_recommendations: vec![VolumeRecommendation {
                account_id: ACCOUNT.to_string(),
                volume_arn: "arn:aws:ec2:eu-west-1:123456789012:volume/vol-1".to_string(),
                current_volume_type: "gp2".to_string(),
                current_size_gb: 100.0,
                root_volume: false,
                finding: "NotOptimized".to_string(),
                options: vec![
                    VolumeOption {
                        rank: 2,
                        volume_type: "st1".to_string(),
                        monthly_savings: 3.0,
                    },
                    VolumeOption {
                        rank: 1,
                        volume_type: "gp3".to_string(),
                        monthly_savings: 12.5,
                    },
                ],
            }],
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), ProviderError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all {
            return Err(ProviderError::Unreachable("mock endpoint down".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProviderClient for MockProvider {
    async fn list_volumes(&self, _region: &str) -> Result<Vec<ResourceRecord>, ProviderError> {
        self.check()?;
        if self.fail_volumes {
            return Err(ProviderError::Throttled("rate exceeded".into()));
        }
        Ok(self.volumes.clone())
    }

    async fn list_db_instances(&self, _region: &str) -> Result<Vec<ResourceRecord>, ProviderError> {
        self.check()?;
        Ok(self.db_instances.clone())
    }

    async fn list_volume_snapshots(
        &self,
        _region: &str,
    ) -> Result<Vec<SnapshotRecord>, ProviderError> {
        self.check()?;
        Ok(self.volume_snapshots.clone())
    }

    async fn list_db_snapshots(&self, _region: &str) -> Result<Vec<SnapshotRecord>, ProviderError> {
        self.check()?;
        Ok(self.db_snapshots.clone())
    }

    async fn metric_series(
        &self,
        _region: &str,
        resource_id: &str,
        _lookback_days: u32,
    ) -> Result<MetricBundle, ProviderError> {
        self.check()?;
        self.metric_calls.fetch_add(1, Ordering::SeqCst);
        self.metrics
            .get(resource_id)
            .cloned()
            .ok_or_else(|| ProviderError::Malformed(format!("no metrics for {resource_id}")))
    }

    async fn instance_recommendations(
        &self,
        _region: &str,
        architecture: Option<CpuArchitecture>,
    ) -> Result<Vec<InstanceRecommendation>, ProviderError> {
        self.check()?;
        Ok(match architecture {
            Some(CpuArchitecture::Arm64) => self.arm_recommendations.clone(),
            _ => self.instance_recommendations.clone(),
        })
    }

    async fn volume_recommendations(
        &self,
        _region: &str,
    ) -> Result<Vec<VolumeRecommendation>, ProviderError> {
        self.check()?;
        Ok(self.volume_recommendations.clone())
    }
}

const ACCOUNT: &str = "123456789012";

fn low_cpu_bundle() -> MetricBundle {
    let mut bundle = MetricBundle::new();
    bundle.insert(
        "CPUUtilization".to_string(),
        MetricSeries {
            avg: vec![8.0; 24],
            max: vec![12.0; 24],
            min: vec![5.0; 24],
        },
    );
    bundle
}

fn volume(id: &str, size_gb: f64, tags: Vec<Tag>) -> ResourceRecord {
    ResourceRecord {
        account_id: ACCOUNT.to_string(),
        resource_id: id.to_string(),
        resource_type: ResourceType::Volume,
        size_gb,
        state: "in-use".to_string(),
        tags,
        engine: None,
        instance_class: None,
    }
}

fn db_instance(id: &str, engine: &str, class: &str, size_gb: f64) -> ResourceRecord {
    ResourceRecord {
        account_id: ACCOUNT.to_string(),
        resource_id: id.to_string(),
        resource_type: ResourceType::DbInstance,
        size_gb,
        state: "available".to_string(),
        tags: vec![],
        engine: Some(engine.to_string()),
        instance_class: Some(class.to_string()),
    }
}

fn snapshot(id: &str, tags: Vec<Tag>) -> SnapshotRecord {
    SnapshotRecord {
        account_id: ACCOUNT.to_string(),
        snapshot_id: id.to_string(),
        kind: SnapshotKind::Ebs,
        source_resource_id: "vol-1".to_string(),
        created_at: Utc::now() - ChronoDuration::days(45),
        size_gb: 200.0,
        tags,
        description: "pre-upgrade".to_string(),
    }
}

fn instance_recommendation(
    name: &str,
    current: &str,
    recommended: &str,
    savings: f64,
) -> InstanceRecommendation {
    InstanceRecommendation {
        account_id: ACCOUNT.to_string(),
        instance_arn: format!("arn:aws:ec2:eu-west-1:{ACCOUNT}:instance/{name}"),
        instance_name: name.to_string(),
        current_instance_type: current.to_string(),
        finding: "OVER_PROVISIONED".to_string(),
        platform: Some("Linux/UNIX".to_string()),
        options: vec![
            InstanceOption {
                rank: 1,
                instance_type: recommended.to_string(),
                monthly_savings: savings,
                migration_effort: Some("Low".to_string()),
            },
            InstanceOption {
                rank: 2,
                instance_type: "t3.large".to_string(),
                monthly_savings: savings / 2.0,
                migration_effort: None,
            },
        ],
    }
}

fn scope() -> RunScope {
    RunScope::new(ACCOUNT, vec!["eu-west-1".to_string()])
}

#[tokio::test]
async fn test_run_produces_all_reports_in_registration_order() {
    let aggregator = Aggregator::with_default_reports();
    let client = Arc::new(MockProvider::with_fixture_data());

    let outputs = aggregator.run(client, &scope()).await.unwrap();

    let names: Vec<&str> = outputs.iter().map(|o| o.name.as_str()).collect();
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

    let by_name: HashMap<&str, &optimizer_lib::aggregate::ReportOutput> =
        outputs.iter().map(|o| (o.name.as_str(), o)).collect();

    // vol-1 Standard (115.0) kept, vol-2 Critical dropped, orders-db
    // Standard RDS 50 GB: 142.5 - 33.25 = 109.25
    let backup = by_name["backup_cost"];
    assert_eq!(backup.table.len(), 2);
    assert_eq!(backup.savings, 224.25);

    // snap-1 manual (200 GB x 0.05), snap-2 backup-managed skipped
    let audit = by_name["snapshot_audit"];
    assert_eq!(audit.table.len(), 1);
    assert_eq!(audit.savings, 10.0);

    // Rank-1 options only
    assert_eq!(by_name["instance_rightsizing"].savings, 42.0);
    assert_eq!(by_name["ebs_rightsizing"].savings, 12.5);
    assert_eq!(by_name["graviton_migration"].savings, 55.5);
    assert!(!by_name["graviton_migration"].display_savings);

    // Low-utilization mysql on db.t3.large: 120 x (0.5 + 0.1)
    let serverless = by_name["rds_serverless"];
    assert_eq!(serverless.table.len(), 1);
    assert_eq!(serverless.savings, 72.0);
}

#[tokio::test]
async fn test_failing_provider_degrades_every_report_to_placeholder() {
    let aggregator = Aggregator::with_default_reports();
    let client = Arc::new(MockProvider::failing());

    let outputs = aggregator.run(client, &scope()).await.unwrap();

    assert_eq!(outputs.len(), 6);
    for output in &outputs {
        assert_eq!(
            output.table.len(),
            1,
            "report {} should produce exactly one placeholder row",
            output.name
        );
        assert_eq!(output.savings, 0.0);
    }
}

#[tokio::test]
async fn test_partial_failure_keeps_sibling_sources() {
    let mut provider = MockProvider::with_fixture_data();
    provider.fail_volumes = true;
    let aggregator = Aggregator::with_default_reports();

    let outputs = aggregator.run(Arc::new(provider), &scope()).await.unwrap();
    let backup = outputs.iter().find(|o| o.name == "backup_cost").unwrap();

    // Volume enumeration failed but the database source still contributed
    assert_eq!(backup.table.len(), 1);
    assert_eq!(backup.savings, 109.25);
}

#[tokio::test]
async fn test_collect_and_score_is_idempotent() {
    let aggregator = Aggregator::with_default_reports();
    let client = Arc::new(MockProvider::with_fixture_data());

    let first = aggregator.run(client.clone(), &scope()).await.unwrap();
    let second = aggregator.run(client, &scope()).await.unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.table, b.table, "table for {} differs across runs", a.name);
        assert_eq!(a.savings, b.savings);
    }
}

/// A report that declares one schema and produces another
struct BrokenReport;

#[async_trait]
impl Report for BrokenReport {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn title(&self) -> &'static str {
        "BROKEN"
    }

    fn domain(&self) -> Domain {
        Domain::Compute
    }

    fn description(&self) -> &'static str {
        "Declares columns it does not produce."
    }

    fn authors(&self) -> &'static [&'static str] {
        &["nobody"]
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &["account_id", "resource_id"]
    }

    fn presentation(&self) -> PresentationMetadata {
        PresentationMetadata {
            chart_type: ChartType::None,
            category_range: CellRange::new(0, 0, 0, 0),
            value_range: CellRange::new(1, 1, 1, -1),
            currency_columns: &[],
            group_by: &[],
        }
    }

    async fn collect_and_score(
        &self,
        _client: Arc<dyn ProviderClient>,
        _scope: &RunScope,
    ) -> ReportTable {
        ReportTable::new(&["account", "something_else"])
    }
}

#[tokio::test]
async fn test_schema_mismatch_fails_loudly() {
    let mut aggregator = Aggregator::new();
    aggregator.register(Arc::new(BrokenReport));
    let client = Arc::new(MockProvider::with_fixture_data());

    let err = aggregator.run(client, &scope()).await.unwrap_err();
    match err {
        EngineError::SchemaMismatch { report, .. } => assert_eq!(report, "broken"),
        other => panic!("expected SchemaMismatch, got {other}"),
    }
}

#[tokio::test]
async fn test_bad_parameter_aborts_before_collection() {
    let aggregator = Aggregator::with_default_reports();
    let client = Arc::new(MockProvider::with_fixture_data());

    let mut scope = scope();
    scope.params.set("lookback_period", "90");

    let err = aggregator.run(client.clone(), &scope).await.unwrap_err();
    assert!(matches!(err, EngineError::Configuration { .. }));

    // Hard configuration errors abort before touching external systems
    assert_eq!(client.total_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cancelled_run_issues_no_new_calls() {
    let aggregator = Aggregator::with_default_reports();
    let client = Arc::new(MockProvider::with_fixture_data());

    let scope = scope();
    scope.cancel.cancel();

    let outputs = aggregator.run(client.clone(), &scope).await.unwrap();

    assert_eq!(client.total_calls.load(Ordering::SeqCst), 0);
    // Every report still yields its placeholder row for the renderer
    for output in &outputs {
        assert_eq!(output.table.len(), 1);
    }
}
