//! Bounded worker pool for one class of backend calls.

use std::future::Future;
use std::sync::Arc;

use dualsource_core::{Error, Result};
use tokio::sync::Semaphore;
use tracing::debug;

/// Caps the number of in-flight calls against one backend.
///
/// Calls beyond the limit wait for a permit without blocking their worker
/// thread. Pools are created once at startup and shared by every request.
#[derive(Debug)]
pub struct WorkerPool {
    name: String,
    size: usize,
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    /// Create a pool with `size` slots. `size` must not exceed `MAX_POOL_SIZE`.
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        let name = name.into();
        debug!("Worker pool '{}' created with {} slots", name, size);
        Self {
            name,
            size,
            permits: Arc::new(Semaphore::new(size)),
        }
    }

    /// Pool name, used in logs and `PoolClosed` errors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured slot count.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Slots not currently held by a running call.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `call` once a slot is free.
    pub async fn run<F, T>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| Error::PoolClosed(self.name.clone()))?;
        call.await
    }

    /// Refuse new calls. Calls already holding a slot run to completion.
    pub fn close(&self) {
        self.permits.close();
    }
}
