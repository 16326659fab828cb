//! Provider client interface
//!
//! The cloud-provider API clients are external collaborators; the engine
//! only sees this trait and the normalized records it yields. Implementors
//! wrap the real enumeration, metric-retrieval and recommendation APIs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::models::{MetricBundle, ResourceRecord, SnapshotRecord};

/// CPU architecture filter for instance recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuArchitecture {
    Arm64,
    X86_64,
}

/// One rightsizing option for an instance, ranked by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceOption {
    pub rank: u32,
    pub instance_type: String,
    pub monthly_savings: f64,
    #[serde(default)]
    pub migration_effort: Option<String>,
}

/// One rightsizing option for a volume, ranked by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeOption {
    pub rank: u32,
    pub volume_type: String,
    pub monthly_savings: f64,
}

/// Provider rightsizing recommendation for one instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceRecommendation {
    pub account_id: String,
    pub instance_arn: String,
    pub instance_name: String,
    pub current_instance_type: String,
    /// Provider finding ("OVER_PROVISIONED", "UNDER_PROVISIONED", ...)
    pub finding: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub options: Vec<InstanceOption>,
}

/// Provider rightsizing recommendation for one volume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeRecommendation {
    pub account_id: String,
    pub volume_arn: String,
    pub current_volume_type: String,
    pub current_size_gb: f64,
    pub root_volume: bool,
    pub finding: String,
    #[serde(default)]
    pub options: Vec<VolumeOption>,
}

/// Anything carrying a provider-assigned option rank
pub trait Ranked {
    fn rank(&self) -> u32;
}

impl Ranked for InstanceOption {
    fn rank(&self) -> u32 {
        self.rank
    }
}

impl Ranked for VolumeOption {
    fn rank(&self) -> u32 {
        self.rank
    }
}

/// Select the provider's top-ranked option.
///
/// Rank selection is an explicit find on `rank == 1`; a recommendation
/// without a rank-1 option yields `None`, which callers treat as zero
/// savings rather than an error.
pub fn top_ranked<T: Ranked>(options: &[T]) -> Option<&T> {
    options.iter().find(|o| o.rank() == 1)
}

/// Region component of a provider ARN, when present
pub fn region_of_arn(arn: &str) -> Option<&str> {
    arn.split(':').nth(3).filter(|r| !r.is_empty())
}

/// Interface every cloud-provider client supplies to the engine.
///
/// All operations are read-only against provider state; every failure is a
/// [`ProviderError`] the calling module recovers from locally.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Enumerate block-storage volumes in a region
    async fn list_volumes(&self, region: &str) -> Result<Vec<ResourceRecord>, ProviderError>;

    /// Enumerate database instances in a region
    async fn list_db_instances(&self, region: &str) -> Result<Vec<ResourceRecord>, ProviderError>;

    /// Enumerate volume snapshots owned by the account
    async fn list_volume_snapshots(
        &self,
        region: &str,
    ) -> Result<Vec<SnapshotRecord>, ProviderError>;

    /// Enumerate manual database snapshots
    async fn list_db_snapshots(&self, region: &str) -> Result<Vec<SnapshotRecord>, ProviderError>;

    /// Fetch utilization time series for one resource over a lookback window
    async fn metric_series(
        &self,
        region: &str,
        resource_id: &str,
        lookback_days: u32,
    ) -> Result<MetricBundle, ProviderError>;

    /// Fetch instance rightsizing recommendations, optionally constrained
    /// to a CPU architecture
    async fn instance_recommendations(
        &self,
        region: &str,
        architecture: Option<CpuArchitecture>,
    ) -> Result<Vec<InstanceRecommendation>, ProviderError>;

    /// Fetch volume rightsizing recommendations
    async fn volume_recommendations(
        &self,
        region: &str,
    ) -> Result<Vec<VolumeRecommendation>, ProviderError>;
}
