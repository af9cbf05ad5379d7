//! Prometheus-backed metrics.
//!
//! This module defines a [`MetricsRegistry`] that owns a Prometheus
//! registry and a set of strongly-typed ledger metrics.

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder};
use tracing::warn;

/// Ledger-related Prometheus metrics.
///
/// Cloning is cheap; clones update the same underlying series.
#[derive(Clone)]
pub struct LedgerMetrics {
    /// Blocks appended by registry writes (genesis excluded).
    pub blocks_appended: IntCounter,
    /// Grant, revoke and read attempts rejected for lack of authorization.
    pub access_denied: IntCounter,
    /// Current number of blocks in the chain.
    pub chain_length: IntGauge,
    /// Time to re-validate the full chain, in seconds.
    pub validation_seconds: Histogram,
}

impl LedgerMetrics {
    /// Registers ledger metrics into the given `Registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let blocks_appended = IntCounter::with_opts(Opts::new(
            "blocks_appended_total",
            "Total number of blocks appended by registry operations",
        ))?;
        registry.register(Box::new(blocks_appended.clone()))?;

        let access_denied = IntCounter::with_opts(Opts::new(
            "access_denied_total",
            "Total number of registry operations rejected as unauthorized",
        ))?;
        registry.register(Box::new(access_denied.clone()))?;

        let chain_length = IntGauge::with_opts(Opts::new(
            "chain_length",
            "Number of blocks in the chain, genesis included",
        ))?;
        registry.register(Box::new(chain_length.clone()))?;

        let validation_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "validation_seconds",
                "Time to validate the full chain in seconds",
            )
            .buckets(vec![
                0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0,
            ]),
        )?;
        registry.register(Box::new(validation_seconds.clone()))?;

        Ok(Self {
            blocks_appended,
            access_denied,
            chain_length,
            validation_seconds,
        })
    }
}

/// Wrapper around a Prometheus registry and the ledger metrics.
///
/// This is the main handle you pass around in a binary. It can be wrapped
/// in an `Arc` and shared across threads/tasks.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    pub ledger: LedgerMetrics,
}

impl MetricsRegistry {
    /// Creates a new `MetricsRegistry` with a fresh `ledger`-prefixed
    /// `Registry` and registers the ledger metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("ledger".to_string()), None)?;
        let ledger = LedgerMetrics::register(&registry)?;
        Ok(Self { registry, ledger })
    }

    /// Encodes all metrics in this registry into the Prometheus text format.
    pub fn gather_text(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            warn!("failed to encode Prometheus metrics: {e}");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
