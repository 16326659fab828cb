//! Tag-driven resource classification
//!
//! Pure functions mapping provider tags to a criticality verdict or
//! backup-governance facts. Unrecognized tag shapes simply fail to match;
//! nothing here can fail.

use serde::{Deserialize, Serialize};

use crate::models::Tag;

/// Tag keys consulted for criticality classification
const CRITICALITY_KEYS: &[&str] = &["criticality", "tier", "environment"];

/// Tag-derived importance tier of a resource, driving retention policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CriticalityLevel {
    Critical,
    Important,
    Standard,
}

impl CriticalityLevel {
    pub fn label(&self) -> &'static str {
        match self {
            CriticalityLevel::Critical => "Critical",
            CriticalityLevel::Important => "Important",
            CriticalityLevel::Standard => "Standard",
        }
    }

    /// Compliance posture implied by the tier
    pub fn compliance_label(&self) -> &'static str {
        match self {
            CriticalityLevel::Critical => "SOC2/PCI-DSS Ready",
            CriticalityLevel::Important => "Standard Compliance",
            CriticalityLevel::Standard => "Basic Protection",
        }
    }

    /// Cross-region backup replication is reserved for Critical resources
    pub fn needs_cross_region(&self) -> bool {
        matches!(self, CriticalityLevel::Critical)
    }
}

/// Classify a resource's criticality from its tags.
///
/// Scans tags in their given order; the first tag whose lowercased key is
/// one of {criticality, tier, environment} and whose lowercased value
/// matches a known level wins. No match yields Standard.
pub fn classify_criticality(tags: &[Tag]) -> CriticalityLevel {
    for tag in tags {
        if !CRITICALITY_KEYS.contains(&tag.key.to_lowercase().as_str()) {
            continue;
        }
        match tag.value.to_lowercase().as_str() {
            "critical" | "production" | "prod" => return CriticalityLevel::Critical,
            "important" | "staging" | "test" => return CriticalityLevel::Important,
            _ => {}
        }
    }
    CriticalityLevel::Standard
}

/// Whether a snapshot was created by the managed backup service.
///
/// True when the `aws:backup:source-resource` tag is present, or when a
/// `CreatedBy` tag value mentions "backup" (case-insensitive).
pub fn is_backup_managed(tags: &[Tag]) -> bool {
    for tag in tags {
        if tag.key == "aws:backup:source-resource" {
            return true;
        }
        if tag.key == "CreatedBy" && tag.value.to_lowercase().contains("backup") {
            return true;
        }
    }
    false
}

/// Who created a snapshot, from the `CreatedBy` tag
pub fn created_by(tags: &[Tag]) -> &str {
    tags.iter()
        .find(|t| t.key == "CreatedBy")
        .map(|t| t.value.as_str())
        .unwrap_or("Manual/Unknown")
}
