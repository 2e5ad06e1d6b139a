//! Pool-bound call surface over the two lookups.

use std::sync::Arc;

use dualsource_core::{ItemSet, OrchestrationConfig, ResolvedSet, Result};

use crate::lookup::{PrimaryLookup, SecondaryLookup};
use crate::pool::WorkerPool;

/// Both lookups together with the worker pool each one runs on.
///
/// Cheap to clone; every clone shares the same pools.
#[derive(Clone)]
pub struct Backends {
    primary: Arc<dyn PrimaryLookup>,
    secondary: Arc<dyn SecondaryLookup>,
    primary_pool: Arc<WorkerPool>,
    secondary_pool: Arc<WorkerPool>,
}

impl Backends {
    /// Wrap both lookups, sizing each pool from `config`.
    pub fn new(
        primary: Arc<dyn PrimaryLookup>,
        secondary: Arc<dyn SecondaryLookup>,
        config: &OrchestrationConfig,
    ) -> Self {
        Self {
            primary,
            secondary,
            primary_pool: Arc::new(WorkerPool::new("primary", config.primary_pool_size)),
            secondary_pool: Arc::new(WorkerPool::new("secondary", config.secondary_pool_size)),
        }
    }

    /// Look up `item` on the primary backend.
    pub async fn call_primary(&self, item: &str) -> Result<String> {
        self.primary_pool.run(self.primary.lookup(item)).await
    }

    /// Look up `item` on the secondary backend.
    pub async fn call_secondary(&self, item: &str) -> Result<String> {
        self.secondary_pool.run(self.secondary.lookup(item)).await
    }

    /// Look up every item of `items` in one secondary call. Takes a single slot.
    pub async fn call_secondary_batch(&self, items: &ItemSet) -> Result<ResolvedSet> {
        self.secondary_pool
            .run(self.secondary.lookup_batch(items))
            .await
    }

    /// Get the primary worker pool.
    pub fn primary_pool(&self) -> &WorkerPool {
        &self.primary_pool
    }

    /// Get the secondary worker pool.
    pub fn secondary_pool(&self) -> &WorkerPool {
        &self.secondary_pool
    }
}
