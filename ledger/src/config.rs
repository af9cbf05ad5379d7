//! Top-level configuration for a ledger process.
//!
//! This module aggregates configuration for:
//!
//! - storage (path of the chain document),
//! - registry behaviour (re-record policy),
//! - metrics (enable flag).
//!
//! The goal is to have a single `LedgerConfig` struct that binaries can
//! construct from defaults or from environment variables.

use std::env;
use std::path::PathBuf;

use crate::registry::RegistryConfig;
use crate::storage::FileStoreConfig;

/// Environment variable overriding [`FileStoreConfig::path`].
pub const ENV_CHAIN_PATH: &str = "LEDGER_CHAIN_PATH";
/// Environment variable overriding [`RegistryConfig::reject_rerecord`].
pub const ENV_REJECT_RERECORD: &str = "LEDGER_REJECT_RERECORD";
/// Environment variable overriding [`MetricsConfig::enabled`].
pub const ENV_METRICS_ENABLED: &str = "LEDGER_METRICS_ENABLED";

/// Configuration for ledger metrics.
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Whether to collect and expose Prometheus metrics.
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Top-level configuration for a ledger process.
#[derive(Clone, Debug, Default)]
pub struct LedgerConfig {
    pub storage: FileStoreConfig,
    pub registry: RegistryConfig,
    pub metrics: MetricsConfig,
}

impl LedgerConfig {
    /// Defaults overridden by `LEDGER_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each key.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(path) = lookup(ENV_CHAIN_PATH).filter(|p| !p.is_empty()) {
            cfg.storage.path = PathBuf::from(path);
        }
        if let Some(flag) = lookup(ENV_REJECT_RERECORD).and_then(|v| parse_flag(&v)) {
            cfg.registry.reject_rerecord = flag;
        }
        if let Some(flag) = lookup(ENV_METRICS_ENABLED).and_then(|v| parse_flag(&v)) {
            cfg.metrics.enabled = flag;
        }
        cfg
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
