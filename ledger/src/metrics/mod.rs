//! Metrics and instrumentation for the ledger.
//!
//! This module defines Prometheus-compatible metrics for the ledger and
//! registry. Binaries render them in the Prometheus text format, e.g. on
//! the gateway's `/metrics` route.
//!
//! Typical usage:
//!
//! ```ignore
//! use ledger::metrics::MetricsRegistry;
//!
//! let metrics = MetricsRegistry::new()?;
//! let registry = registry.with_metrics(metrics.ledger.clone());
//!
//! // Later, e.g. in an HTTP handler:
//! let body = metrics.gather_text();
//! ```

pub mod prometheus;

pub use self::prometheus::{LedgerMetrics, MetricsRegistry};
