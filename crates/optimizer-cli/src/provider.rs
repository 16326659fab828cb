//! Inventory snapshot provider
//!
//! Implements the engine's provider interface from a JSON inventory
//! snapshot on disk, standing in for the live cloud API clients. Useful
//! for dry runs against exported inventories and for demos.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use optimizer_lib::error::ProviderError;
use optimizer_lib::models::{MetricBundle, ResourceRecord, SnapshotRecord};
use optimizer_lib::provider::{
    CpuArchitecture, InstanceRecommendation, ProviderClient, VolumeRecommendation,
};

/// On-disk shape of an exported inventory
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InventorySnapshot {
    pub volumes: Vec<ResourceRecord>,
    pub db_instances: Vec<ResourceRecord>,
    pub volume_snapshots: Vec<SnapshotRecord>,
    pub db_snapshots: Vec<SnapshotRecord>,
    /// Metric bundles keyed by resource id
    pub metrics: HashMap<String, MetricBundle>,
    pub instance_recommendations: Vec<InstanceRecommendation>,
    /// Recommendations computed with the ARM64 architecture constraint
    pub graviton_recommendations: Vec<InstanceRecommendation>,
    pub volume_recommendations: Vec<VolumeRecommendation>,
}

/// Provider client backed by one loaded [`InventorySnapshot`]
pub struct SnapshotProvider {
    inventory: InventorySnapshot,
}

impl SnapshotProvider {
    pub fn new(inventory: InventorySnapshot) -> Self {
        Self { inventory }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading inventory snapshot {}", path.display()))?;
        let inventory: InventorySnapshot = serde_json::from_str(&raw)
            .with_context(|| format!("parsing inventory snapshot {}", path.display()))?;
        Ok(Self::new(inventory))
    }
}

#[async_trait]
impl ProviderClient for SnapshotProvider {
    async fn list_volumes(&self, _region: &str) -> Result<Vec<ResourceRecord>, ProviderError> {
        Ok(self.inventory.volumes.clone())
    }

    async fn list_db_instances(&self, _region: &str) -> Result<Vec<ResourceRecord>, ProviderError> {
        Ok(self.inventory.db_instances.clone())
    }

    async fn list_volume_snapshots(
        &self,
        _region: &str,
    ) -> Result<Vec<SnapshotRecord>, ProviderError> {
        Ok(self.inventory.volume_snapshots.clone())
    }

    async fn list_db_snapshots(&self, _region: &str) -> Result<Vec<SnapshotRecord>, ProviderError> {
        Ok(self.inventory.db_snapshots.clone())
    }

    async fn metric_series(
        &self,
        _region: &str,
        resource_id: &str,
        _lookback_days: u32,
    ) -> Result<MetricBundle, ProviderError> {
        self.inventory
            .metrics
            .get(resource_id)
            .cloned()
            .ok_or_else(|| {
                ProviderError::Malformed(format!("no metric series for {resource_id} in snapshot"))
            })
    }

    async fn instance_recommendations(
        &self,
        _region: &str,
        architecture: Option<CpuArchitecture>,
    ) -> Result<Vec<InstanceRecommendation>, ProviderError> {
        Ok(match architecture {
            Some(CpuArchitecture::Arm64) => self.inventory.graviton_recommendations.clone(),
            _ => self.inventory.instance_recommendations.clone(),
        })
    }

    async fn volume_recommendations(
        &self,
        _region: &str,
    ) -> Result<Vec<VolumeRecommendation>, ProviderError> {
        Ok(self.inventory.volume_recommendations.clone())
    }
}
