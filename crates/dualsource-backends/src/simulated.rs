//! Simulated sources used by the standalone server.
//!
//! Both resolve an item to its uppercase form. The primary is slow enough
//! that the grace period usually expires first; the secondary answers in
//! about a second, and its batch path answers immediately.

use std::ops::Range;
use std::time::Duration;

use async_trait::async_trait;
use dualsource_core::{ItemSet, ResolvedSet, Result};
use rand::Rng;
use tracing::debug;

use crate::lookup::{PrimaryLookup, SecondaryLookup};

#[derive(Debug, Clone)]
pub struct SimulatedPrimary {
    latency_ms: Range<u64>,
}

impl SimulatedPrimary {
    pub fn new(latency: Range<Duration>) -> Self {
        Self {
            latency_ms: millis(latency),
        }
    }
}

impl Default for SimulatedPrimary {
    fn default() -> Self {
        Self::new(Duration::from_secs(3)..Duration::from_secs(5))
    }
}

#[async_trait]
impl PrimaryLookup for SimulatedPrimary {
    async fn lookup(&self, item: &str) -> Result<String> {
        let wait = sample(&self.latency_ms);
        debug!("Primary lookup for '{}' will take {:?}", item, wait);
        tokio::time::sleep(wait).await;
        Ok(item.to_uppercase())
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedSecondary {
    latency_ms: Range<u64>,
}

impl SimulatedSecondary {
    pub fn new(latency: Range<Duration>) -> Self {
        Self {
            latency_ms: millis(latency),
        }
    }
}

impl Default for SimulatedSecondary {
    fn default() -> Self {
        Self::new(Duration::from_secs(1)..Duration::from_secs(2))
    }
}

#[async_trait]
impl SecondaryLookup for SimulatedSecondary {
    async fn lookup(&self, item: &str) -> Result<String> {
        let wait = sample(&self.latency_ms);
        debug!("Secondary lookup for '{}' will take {:?}", item, wait);
        tokio::time::sleep(wait).await;
        Ok(item.to_uppercase())
    }

    async fn lookup_batch(&self, items: &ItemSet) -> Result<ResolvedSet> {
        Ok(items.iter().map(|item| item.to_uppercase()).collect())
    }
}

fn millis(range: Range<Duration>) -> Range<u64> {
    range.start.as_millis() as u64..range.end.as_millis() as u64
}

fn sample(range: &Range<u64>) -> Duration {
    if range.start >= range.end {
        return Duration::from_millis(range.start);
    }
    Duration::from_millis(rand::thread_rng().gen_range(range.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_primary_uppercases_within_latency() {
        let primary = SimulatedPrimary::new(Duration::from_millis(5)..Duration::from_millis(15));
        let start = std::time::Instant::now();
        assert_eq!(primary.lookup("alice").await.unwrap(), "ALICE");
        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    #[tokio::test]
    async fn test_secondary_batch_uppercases_all() {
        let secondary = SimulatedSecondary::default();
        let items: ItemSet = ["bob", "carol"].iter().map(|s| s.to_string()).collect();
        let resolved = secondary.lookup_batch(&items).await.unwrap();
        assert!(resolved.contains("BOB"));
        assert!(resolved.contains("CAROL"));
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn test_sample_degenerate_range() {
        assert_eq!(sample(&(7..7)), Duration::from_millis(7));
        let drawn = sample(&(10..20));
        assert!(drawn >= Duration::from_millis(10) && drawn < Duration::from_millis(20));
    }
}
