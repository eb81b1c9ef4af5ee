//! Controller configuration loaded from the environment

use std::time::Duration;

use crate::error::{Error, Result};

/// Default metrics port
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Default region used to derive the mesh endpoint
pub const DEFAULT_REGION: &str = "us-west-2";

/// Default interval between periodic reconciliations
pub const DEFAULT_RESYNC_INTERVAL: Duration = Duration::from_secs(300);

/// Controller configuration
#[derive(Clone, Debug, PartialEq)]
pub struct OperatorConfig {
    /// Port of the metrics and health server
    pub metrics_port: u16,

    /// Base URL of the mesh control plane API
    pub appmesh_endpoint: String,

    /// Requeue interval after a successful reconciliation
    pub resync_interval: Duration,
}

impl OperatorConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` to read variables
    ///
    /// Recognized variables: `METRICS_PORT`, `APPMESH_ENDPOINT`, `AWS_REGION`,
    /// `RESYNC_INTERVAL_SECS`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let metrics_port = match lookup("METRICS_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| Error::config(format!("Invalid METRICS_PORT '{}': {}", raw, e)))?,
            None => DEFAULT_METRICS_PORT,
        };

        let appmesh_endpoint = match lookup("APPMESH_ENDPOINT").filter(|e| !e.is_empty()) {
            Some(endpoint) => endpoint,
            None => {
                let region = lookup("AWS_REGION")
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| DEFAULT_REGION.to_string());
                format!("https://appmesh.{}.amazonaws.com", region)
            }
        };

        let resync_interval = match lookup("RESYNC_INTERVAL_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| {
                    Error::config(format!("Invalid RESYNC_INTERVAL_SECS '{}': {}", raw, e))
                })?;
                if secs == 0 {
                    return Err(Error::config("RESYNC_INTERVAL_SECS must be greater than 0"));
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_RESYNC_INTERVAL,
        };

        Ok(Self {
            metrics_port,
            appmesh_endpoint,
            resync_interval,
        })
    }
}
