//! Per-item resolution: primary lookup raced against a gated secondary lookup.

use std::sync::Arc;
use std::time::Duration;

use dualsource_backends::{Backends, NotifyHook};
use dualsource_core::{Resolution, Result};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::gate::GateTimer;
use crate::race::race;
use crate::types::Decided;

/// Launch a primary lookup for `item` on the primary pool.
///
/// The outcome is reported through `hook` as soon as the call completes,
/// whether or not this branch ends up winning. Failures become `Absent`.
pub(crate) fn spawn_primary(
    backends: &Backends,
    hook: &NotifyHook,
    item: String,
) -> JoinHandle<Resolution> {
    let backends = backends.clone();
    let hook = hook.clone();
    tokio::spawn(async move {
        let outcome = backends.call_primary(&item).await;
        hook.report(&item, &outcome);
        outcome.into()
    })
}

/// Resolves one item at a time. Cheap to clone.
#[derive(Clone)]
pub struct ItemResolver {
    backends: Backends,
    hook: NotifyHook,
    timer: Arc<GateTimer>,
    grace_period: Duration,
}

impl ItemResolver {
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

    /// Resolve `item`, returning `Absent` if neither source produced a value.
    pub async fn resolve(&self, item: &str) -> Result<Resolution> {
        Ok(self.resolve_decided(item).await?.value)
    }

    /// Like `resolve`, also reporting which branch won.
    pub async fn resolve_decided(&self, item: &str) -> Result<Decided<Resolution>> {
        let primary = spawn_primary(&self.backends, &self.hook, item.to_string());
        let secondary = self.spawn_secondary(item.to_string());

        let decided = race(primary, secondary, Resolution::is_present).await?;
        debug!("Item '{}' resolved by {:?} branch", item, decided.branch);
        Ok(decided)
    }

    /// The secondary branch completes only after both the grace period and
    /// the lookup are done. The gate is armed before the task is spawned.
    fn spawn_secondary(&self, item: String) -> JoinHandle<Result<Resolution>> {
        let gate = self.timer.arm(self.grace_period);
        let backends = self.backends.clone();
        let hook = self.hook.clone();
        tokio::spawn(async move {
            let lookup = async {
                let outcome = backends.call_secondary(&item).await;
                hook.report_if_failed(&item, &outcome);
                outcome
            };
            let (fired, outcome) = tokio::join!(gate.fired(), lookup);
            fired?;
            Ok(outcome.into())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Branch;
    use dualsource_backends::{Notification, Outcome, RecordingNotifier, ScriptedLookup};
    use dualsource_core::OrchestrationConfig;
    use std::time::Instant;

    const GRACE: Duration = Duration::from_millis(200);

    struct Fixture {
        resolver: ItemResolver,
        primary: Arc<ScriptedLookup>,
        notifier: Arc<RecordingNotifier>,
    }

    fn fixture(primary: ScriptedLookup, secondary: ScriptedLookup) -> Fixture {
        let primary = Arc::new(primary);
        let secondary = Arc::new(secondary);
        let notifier = Arc::new(RecordingNotifier::new());
        let config = OrchestrationConfig::default().with_grace_period(GRACE);
        let backends = Backends::new(primary.clone(), secondary, &config);
        let timer = Arc::new(GateTimer::start().unwrap());
        let resolver = ItemResolver::new(backends, NotifyHook::new(notifier.clone()), timer, GRACE);
        Fixture {
            resolver,
            primary,
            notifier,
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_primary_success_before_grace() {
        let f = fixture(
            ScriptedLookup::echo().on_after("a", Outcome::Value("A".into()), Duration::from_millis(10)),
            ScriptedLookup::echo().on("a", Outcome::Value("a-secondary".into())),
        );

        let start = Instant::now();
        let decided = f.resolver.resolve_decided("a").await.unwrap();

        assert_eq!(decided.branch, Branch::Primary);
        assert_eq!(decided.value, Resolution::Present("A".into()));
        assert!(start.elapsed() < GRACE);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_primary_failure_waits_for_gated_secondary() {
        let f = fixture(
            ScriptedLookup::failing("api down"),
            ScriptedLookup::echo().on("b", Outcome::Value("B".into())),
        );

        let start = Instant::now();
        let resolution = f.resolver.resolve("b").await.unwrap();

        assert_eq!(resolution, Resolution::Present("B".into()));
        assert!(start.elapsed() >= GRACE);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_hanging_primary_is_bounded_by_secondary() {
        let f = fixture(
            ScriptedLookup::echo().on("c", Outcome::Hang),
            ScriptedLookup::echo().on("c", Outcome::Value("C".into())),
        );

        let resolution = tokio::time::timeout(Duration::from_secs(2), f.resolver.resolve("c"))
            .await
            .expect("secondary branch should bound the wait")
            .unwrap();
        assert_eq!(resolution, Resolution::Present("C".into()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_both_fail_is_absent() {
        let f = fixture(ScriptedLookup::failing("api down"), ScriptedLookup::failing("db down"));

        let resolution = f.resolver.resolve("d").await.unwrap();
        assert_eq!(resolution, Resolution::Absent);

        let seen = f.notifier.wait_for(2, Duration::from_secs(1)).await;
        let failures: Vec<_> = seen
            .iter()
            .filter(|n| matches!(n, Notification::Failure { item, .. } if item == "d"))
            .collect();
        assert_eq!(failures.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_slow_primary_success_loses_to_secondary() {
        // Primary finishes after the grace period but after the secondary too.
        let f = fixture(
            ScriptedLookup::echo().on_after("e", Outcome::Value("E-primary".into()), GRACE * 2),
            ScriptedLookup::echo().on("e", Outcome::Value("E-secondary".into())),
        );

        let decided = f.resolver.resolve_decided("e").await.unwrap();
        assert_eq!(decided.branch, Branch::Secondary);
        assert_eq!(decided.value, Resolution::Present("E-secondary".into()));

        // The losing primary still runs to completion and is reported.
        let seen = f.notifier.wait_for(1, Duration::from_secs(2)).await;
        assert!(seen.contains(&Notification::Success {
            item: "e".into(),
            value: "E-primary".into()
        }));
        assert_eq!(f.primary.calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_primary_success_is_notified() {
        let f = fixture(ScriptedLookup::echo(), ScriptedLookup::echo());

        f.resolver.resolve("f").await.unwrap();

        let seen = f.notifier.wait_for(1, Duration::from_secs(1)).await;
        assert_eq!(
            seen,
            vec![Notification::Success {
                item: "f".into(),
                value: "f".into()
            }]
        );
    }
}
