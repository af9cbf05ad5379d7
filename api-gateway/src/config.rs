//! API gateway configuration.
//!
//! This only configures the HTTP listen address. The ledger configuration
//! is taken from `ledger::LedgerConfig::from_env()`.

use std::net::SocketAddr;

/// Environment variable overriding [`ApiConfig::listen_addr`].
pub const ENV_API_ADDR: &str = "LEDGER_API_ADDR";

/// Configuration for the API gateway HTTP server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP server to.
    pub listen_addr: SocketAddr,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8081)),
        }
    }
}

impl ApiConfig {
    /// Defaults, with the listen address taken from `LEDGER_API_ADDR` when
    /// it is set and parses.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(raw) = std::env::var(ENV_API_ADDR) {
            match raw.parse() {
                Ok(addr) => cfg.listen_addr = addr,
                Err(e) => tracing::warn!("ignoring {ENV_API_ADDR}={raw:?}: {e}"),
            }
        }
        cfg
    }
}
