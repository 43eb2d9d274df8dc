//! Tracing setup
//!
//! Logs go to stderr so stdout carries only report output.
//!
//! Usage:
//!   geoquery --verbose ...             # Debug logging
//!   RUST_LOG=geoquery=trace geoquery   # Fine-grained log control
//!
//! Environment variables:
//!   RUST_LOG                           # Log filter (default: warn)

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingConfig {
    /// Debug level unless `RUST_LOG` is explicitly set
    pub verbose: bool,
}

impl TracingConfig {
    fn default_directive(self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

/// Initialize the global subscriber
///
/// Fails if a subscriber is already installed.
pub fn init_tracing(config: TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(config.verbose)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(TracingConfig { verbose: true }.default_directive(), "debug");
        assert_eq!(TracingConfig::default().default_directive(), "warn");
    }
}
