//! Backend lookup contracts.

use async_trait::async_trait;
use dualsource_core::{ItemSet, ResolvedSet, Result};

/// The fast, unreliable source.
#[async_trait]
pub trait PrimaryLookup: Send + Sync {
    /// Resolve a single item. Fails on any backend error.
    async fn lookup(&self, item: &str) -> Result<String>;
}

/// The slower, reliable source with a native batch capability.
#[async_trait]
pub trait SecondaryLookup: Send + Sync {
    /// Resolve a single item. Fails on any backend error.
    async fn lookup(&self, item: &str) -> Result<String>;

    /// Resolve a whole set in one call. A failure covers every item.
    async fn lookup_batch(&self, items: &ItemSet) -> Result<ResolvedSet>;
}
