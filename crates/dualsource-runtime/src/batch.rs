//! Bulk resolution: aggregated primaries raced against one secondary batch call.

use std::sync::Arc;
use std::time::Duration;

use dualsource_backends::{Backends, NotifyHook};
use dualsource_core::{collect_present, ItemSet, ResolvedSet, Resolution, Result};
use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::gate::GateTimer;
use crate::item::spawn_primary;
use crate::race::race;
use crate::types::Decided;

/// Resolves a whole request in one race.
///
/// The two branches fail differently: a failed batch call empties the whole
/// secondary branch, while the primary branch keeps every item whose own
/// lookup succeeded.
#[derive(Clone)]
pub struct BatchResolver {
    backends: Backends,
    hook: NotifyHook,
    timer: Arc<GateTimer>,
    grace_period: Duration,
}

impl BatchResolver {
    pub fn new(
        backends: Backends,
        hook: NotifyHook,
        timer: Arc<GateTimer>,
        grace_period: Duration,
    ) -> Self {
        Self {
            backends,
            hook,
            timer,
            grace_period,
        }
    }

    pub async fn resolve(&self, items: &ItemSet) -> Result<ResolvedSet> {
        Ok(self.resolve_decided(items).await?.value)
    }

    pub async fn resolve_decided(&self, items: &ItemSet) -> Result<Decided<ResolvedSet>> {
        let secondary = self.spawn_secondary(items.clone());
        let primary = self.spawn_primaries(items);

        let decided = race(primary, secondary, |set: &ResolvedSet| !set.is_empty()).await?;
        debug!(
            "Batch of {} resolved by {:?} branch with {} values",
            items.len(),
            decided.branch,
            decided.value.len()
        );
        Ok(decided)
    }

    fn spawn_secondary(&self, items: ItemSet) -> JoinHandle<Result<ResolvedSet>> {
        let gate = self.timer.arm(self.grace_period);
        let backends = self.backends.clone();
        tokio::spawn(async move {
            let (fired, outcome) = tokio::join!(gate.fired(), backends.call_secondary_batch(&items));
            fired?;
            Ok(outcome.unwrap_or_else(|e| {
                warn!("Secondary batch lookup of {} items failed: {}", items.len(), e);
                ResolvedSet::new()
            }))
        })
    }

    /// One primary lookup per item, fanned back in once every lookup settled.
    fn spawn_primaries(&self, items: &ItemSet) -> JoinHandle<ResolvedSet> {
        let lookups: Vec<JoinHandle<Resolution>> = items
            .iter()
            .map(|item| spawn_primary(&self.backends, &self.hook, item.clone()))
            .collect();

        tokio::spawn(async move {
            let settled = join_all(lookups).await;
            collect_present(settled.into_iter().map(|lookup| lookup.unwrap_or_default()))
        })
    }
}
