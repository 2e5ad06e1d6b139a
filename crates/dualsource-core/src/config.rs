//! Orchestration and server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_GRACE_PERIOD_SECONDS: u64 = 3;
pub const DEFAULT_THRESHOLD: usize = 5;
pub const DEFAULT_PRIMARY_POOL_SIZE: usize = 8;
pub const DEFAULT_SECONDARY_POOL_SIZE: usize = 4;
pub const DEFAULT_PORT: u16 = 8080;

/// Largest pool a worker pool can be built with. Matches the permit ceiling
/// of `tokio::sync::Semaphore`.
pub const MAX_POOL_SIZE: usize = usize::MAX >> 3;

/// Tuning for the orchestration engine. Immutable once the orchestrator is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationConfig {
    /// Minimum wait before a secondary result may resolve.
    ///
    /// Stored in milliseconds so tests can use sub-second periods; the
    /// environment surface is expressed in whole seconds.
    pub grace_period_ms: u64,
    /// Requests with more items than this take the batch path.
    pub threshold: usize,
    /// Concurrent calls allowed against the primary backend.
    pub primary_pool_size: usize,
    /// Concurrent calls allowed against the secondary backend.
    pub secondary_pool_size: usize,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: DEFAULT_GRACE_PERIOD_SECONDS * 1000,
            threshold: DEFAULT_THRESHOLD,
            primary_pool_size: DEFAULT_PRIMARY_POOL_SIZE,
            secondary_pool_size: DEFAULT_SECONDARY_POOL_SIZE,
        }
    }
}

impl OrchestrationConfig {
    /// Read configuration from `DUALSOURCE_*` environment variables.
    ///
    /// Missing or unparseable values fall back to defaults; the result is
    /// validated before it is returned.
    pub fn from_env() -> Result<Self> {
        let grace_seconds = env_or("DUALSOURCE_GRACE_PERIOD_SECONDS", DEFAULT_GRACE_PERIOD_SECONDS);
        let config = Self {
            grace_period_ms: grace_seconds.saturating_mul(1000),
            threshold: env_or("DUALSOURCE_THRESHOLD", DEFAULT_THRESHOLD),
            primary_pool_size: env_or("DUALSOURCE_PRIMARY_POOL", DEFAULT_PRIMARY_POOL_SIZE),
            secondary_pool_size: env_or("DUALSOURCE_SECONDARY_POOL", DEFAULT_SECONDARY_POOL_SIZE),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period_ms = grace_period.as_millis() as u64;
        self
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_pool_sizes(mut self, primary: usize, secondary: usize) -> Self {
        self.primary_pool_size = primary;
        self.secondary_pool_size = secondary;
        self
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.grace_period_ms == 0 {
            return Err(Error::Config("grace period must be greater than zero".into()));
        }
        check_pool_size("primary", self.primary_pool_size)?;
        check_pool_size("secondary", self.secondary_pool_size)
    }
}

fn check_pool_size(name: &str, size: usize) -> Result<()> {
    if size == 0 {
        return Err(Error::Config(format!(
            "{} pool size must be greater than zero",
            name
        )));
    }
    if size > MAX_POOL_SIZE {
        return Err(Error::Config(format!(
            "{} pool size {} exceeds the maximum of {}",
            name, size, MAX_POOL_SIZE
        )));
    }
    Ok(())
}

/// Top-level process configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DualSourceConfig {
    /// HTTP server port.
    pub port: u16,
    pub orchestration: OrchestrationConfig,
}

impl DualSourceConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Result<Self> {
        let port = env_or("PORT", DEFAULT_PORT);
        let orchestration = OrchestrationConfig::from_env()?;
        Ok(Self {
            port,
            orchestration,
        })
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring unparseable {}={:?}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = OrchestrationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grace_period(), Duration::from_secs(3));
        assert_eq!(config.threshold, 5);
    }

    #[test]
    fn test_builder_overrides() {
        let config = OrchestrationConfig::default()
            .with_grace_period(Duration::from_millis(250))
            .with_threshold(0)
            .with_pool_sizes(2, 1);
        assert_eq!(config.grace_period_ms, 250);
        assert_eq!(config.threshold, 0);
        assert_eq!(config.primary_pool_size, 2);
        assert_eq!(config.secondary_pool_size, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let zero_grace = OrchestrationConfig::default().with_grace_period(Duration::ZERO);
        assert!(matches!(zero_grace.validate(), Err(Error::Config(_))));

        let zero_primary = OrchestrationConfig::default().with_pool_sizes(0, 1);
        assert!(matches!(zero_primary.validate(), Err(Error::Config(_))));

        let zero_secondary = OrchestrationConfig::default().with_pool_sizes(1, 0);
        assert!(matches!(zero_secondary.validate(), Err(Error::Config(_))));

        let huge_primary = OrchestrationConfig::default().with_pool_sizes(usize::MAX / 2, 1);
        assert!(matches!(huge_primary.validate(), Err(Error::Config(_))));

        let huge_secondary = OrchestrationConfig::default().with_pool_sizes(1, MAX_POOL_SIZE + 1);
        assert!(matches!(huge_secondary.validate(), Err(Error::Config(_))));

        let largest = OrchestrationConfig::default().with_pool_sizes(MAX_POOL_SIZE, MAX_POOL_SIZE);
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(OrchestrationConfig::default()).unwrap();
        assert_eq!(json["gracePeriodMs"], 3000);
        assert_eq!(json["primaryPoolSize"], 8);
        assert_eq!(json["secondaryPoolSize"], 4);
    }
}
