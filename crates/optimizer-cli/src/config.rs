//! CLI configuration

use anyhow::Result;
use serde::Deserialize;

/// Defaults resolved from the environment, overridable per invocation
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Account id stamped on placeholder rows
    #[serde(default = "default_account")]
    pub account: String,

    /// Region analyzed when none is given on the command line
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_account() -> String {
    "000000000000".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl CliConfig {
    /// Load configuration from COSTOPT_* environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("COSTOPT"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| CliConfig {
            account: default_account(),
            region: default_region(),
        }))
    }
}
