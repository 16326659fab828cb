//! Tunable report parameters
//!
//! Reports declare the parameters they consume; the values themselves are
//! resolved externally (persisted settings, CLI flags) and injected into
//! the run. Validation happens in the aggregator before any collection
//! begins, so a bad value aborts the run without touching external systems.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::EngineError;

/// Days of metric history the workload analysis looks back over
pub const LOOKBACK_PERIOD: ParameterSpec = ParameterSpec {
    name: "lookback_period",
    default: "14",
    allowed: &["7", "14", "30"],
};

/// Declaration of one tunable parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub default: &'static str,
    pub allowed: &'static [&'static str],
}

/// Externally resolved parameter values for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterStore {
    values: HashMap<String, String>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// The injected value for a spec, or its default
    pub fn resolve<'a>(&'a self, spec: &ParameterSpec) -> &'a str {
        self.values
            .get(spec.name)
            .map(String::as_str)
            .unwrap_or(spec.default)
    }

    /// Resolve a numeric parameter; falls back to the default when the
    /// stored value does not parse (validation rejects that case upfront)
    pub fn resolve_u32(&self, spec: &ParameterSpec) -> u32 {
        self.resolve(spec)
            .parse()
            .unwrap_or_else(|_| spec.default.parse().unwrap_or(0))
    }

    /// Check every injected value against its spec's allowed set.
    ///
    /// Specs with no stored value pass (the default applies); a stored
    /// value outside the allowed set is a hard configuration error.
    pub fn validate(&self, specs: &[ParameterSpec]) -> Result<(), EngineError> {
        for spec in specs {
            if let Some(value) = self.values.get(spec.name) {
                if !spec.allowed.contains(&value.as_str()) {
                    return Err(EngineError::Configuration {
                        name: spec.name.to_string(),
                        value: value.clone(),
                        allowed: spec.allowed.iter().map(|s| s.to_string()).collect(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_injected_value() {
        let mut store = ParameterStore::new();
        assert_eq!(store.resolve(&LOOKBACK_PERIOD), "14");
        assert_eq!(store.resolve_u32(&LOOKBACK_PERIOD), 14);

        store.set("lookback_period", "30");
        assert_eq!(store.resolve(&LOOKBACK_PERIOD), "30");
        assert_eq!(store.resolve_u32(&LOOKBACK_PERIOD), 30);
    }

    #[test]
    fn test_validate_accepts_allowed_values() {
        let mut store = ParameterStore::new();
        store.set("lookback_period", "7");
        assert!(store.validate(&[LOOKBACK_PERIOD]).is_ok());

        // Nothing injected: default applies, validation passes
        assert!(ParameterStore::new().validate(&[LOOKBACK_PERIOD]).is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut store = ParameterStore::new();
        store.set("lookback_period", "90");
        let err = store.validate(&[LOOKBACK_PERIOD]).unwrap_err();
        match err {
            EngineError::Configuration { name, value, .. } => {
                assert_eq!(name, "lookback_period");
                assert_eq!(value, "90");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
