//! Orchestrator: picks the resolution path for a request and fans in results.

use std::sync::Arc;

use dualsource_backends::{Backends, Notifier, NotifyHook, PrimaryLookup, SecondaryLookup};
use dualsource_core::{collect_present, Error, ItemSet, OrchestrationConfig, ResolvedSet, Result};
use futures::future::join_all;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

use crate::batch::BatchResolver;
use crate::gate::GateTimer;
use crate::item::ItemResolver;
use crate::types::{ResolvePath, RuntimeStatus};

/// Single entry point for resolving a request.
///
/// Owns the process-wide resources (both worker pools and the gate timer);
/// build one at startup and share it.
pub struct Orchestrator {
    config: OrchestrationConfig,
    backends: Backends,
    items: ItemResolver,
    batch: BatchResolver,
}

impl Orchestrator {
    /// Validate `config`, create the pools and start the gate timer.
    pub fn new(
        config: OrchestrationConfig,
        primary: Arc<dyn PrimaryLookup>,
        secondary: Arc<dyn SecondaryLookup>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        config.validate()?;

        let backends = Backends::new(primary, secondary, &config);
        let hook = NotifyHook::new(notifier);
        let timer = Arc::new(GateTimer::start()?);
        let grace_period = config.grace_period();

        info!(
            "Orchestrator initialized: grace={:?}, threshold={}, primary_pool={}, secondary_pool={}",
            grace_period, config.threshold, config.primary_pool_size, config.secondary_pool_size
        );

        Ok(Self {
            items: ItemResolver::new(backends.clone(), hook.clone(), timer.clone(), grace_period),
            batch: BatchResolver::new(backends.clone(), hook, timer, grace_period),
            backends,
            config,
        })
    }

    /// Get the orchestration config.
    pub fn config(&self) -> &OrchestrationConfig {
        &self.config
    }

    /// Which path a request of this size takes.
    pub fn path_for(&self, items: &ItemSet) -> ResolvePath {
        ResolvePath::for_size(items.len(), self.config.threshold)
    }

    /// Resolve every item of `items`, omitting those with no result.
    ///
    /// Only orchestration faults are returned as errors; backend failures
    /// shrink the response instead.
    pub async fn resolve(&self, items: ItemSet) -> Result<ResolvedSet> {
        let span = info_span!("resolve", request_id = %Uuid::new_v4(), items = items.len());
        async move {
            let requested = items.len();
            let path = self.path_for(&items);
            debug!("Resolving {} items via {:?} path", requested, path);

            let resolved = match path {
                ResolvePath::Empty => ResolvedSet::new(),
                ResolvePath::Batch => self.batch.resolve(&items).await?,
                ResolvePath::PerItem => self.resolve_each(items).await?,
            };

            info!("Resolved {} of {} items", resolved.len(), requested);
            Ok(resolved)
        }
        .instrument(span)
        .await
    }

    /// Fan out one item race per item and wait for all of them.
    async fn resolve_each(&self, items: ItemSet) -> Result<ResolvedSet> {
        let races: Vec<_> = items
            .into_iter()
            .map(|item| {
                let resolver = self.items.clone();
                tokio::spawn(async move { resolver.resolve(&item).await }.in_current_span())
            })
            .collect();

        let mut resolutions = Vec::with_capacity(races.len());
        let mut fault = None;
        for settled in join_all(races).await {
            match settled {
                Ok(Ok(resolution)) => resolutions.push(resolution),
                Ok(Err(e)) => {
                    error!("Item race failed: {}", e);
                    fault.get_or_insert(e);
                }
                Err(e) => {
                    error!("Item race aborted: {}", e);
                    fault.get_or_insert(Error::Task(e.to_string()));
                }
            }
        }

        match fault {
            Some(e) => Err(e),
            None => Ok(collect_present(resolutions)),
        }
    }

    /// Get runtime status.
    pub fn status(&self) -> RuntimeStatus {
        RuntimeStatus {
            config: self.config.clone(),
            primary_pool_available: self.backends.primary_pool().available(),
            secondary_pool_available: self.backends.secondary_pool().available(),
        }
    }
}
