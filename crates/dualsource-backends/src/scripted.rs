//! Deterministic backends and a recording notifier.
//!
//! Used by tests across the workspace to script per-item latency and
//! failures, and to observe what was called and reported.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dualsource_core::{Error, ItemSet, ResolvedSet, Result};
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::lookup::{PrimaryLookup, SecondaryLookup};
use crate::notifier::Notifier;

/// What a scripted call does once its delay has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Return the item unchanged (for batches: the whole input set).
    Echo,
    /// Return this value (for batches: a single-element set).
    Value(String),
    /// Fail with `Error::Backend`.
    Fail(String),
    /// Never complete.
    Hang,
}

/// A lookup whose behaviour is fixed per item up front.
pub struct ScriptedLookup {
    default: Outcome,
    delay: Duration,
    per_item: HashMap<String, (Outcome, Option<Duration>)>,
    batch: Outcome,
    batch_delay: Duration,
    calls: AtomicUsize,
    batch_calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl ScriptedLookup {
    /// Every item echoes back immediately.
    pub fn echo() -> Self {
        Self::with_default(Outcome::Echo)
    }

    /// Every call fails with `reason`.
    pub fn failing(reason: &str) -> Self {
        let mut lookup = Self::with_default(Outcome::Fail(reason.to_string()));
        lookup.batch = Outcome::Fail(reason.to_string());
        lookup
    }

    fn with_default(default: Outcome) -> Self {
        Self {
            default,
            delay: Duration::ZERO,
            per_item: HashMap::new(),
            batch: Outcome::Echo,
            batch_delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            batch_calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Delay applied to every single-item call without its own delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn on(mut self, item: &str, outcome: Outcome) -> Self {
        self.per_item.insert(item.to_string(), (outcome, None));
        self
    }

    pub fn on_after(mut self, item: &str, outcome: Outcome, delay: Duration) -> Self {
        self.per_item.insert(item.to_string(), (outcome, Some(delay)));
        self
    }

    pub fn with_batch(mut self, outcome: Outcome, delay: Duration) -> Self {
        self.batch = outcome;
        self.batch_delay = delay;
        self
    }

    /// Single-item calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    /// Poll until at least `count` batch calls were made or `timeout` passes.
    pub async fn wait_for_batch_calls(&self, count: usize, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        loop {
            let seen = self.batch_calls();
            if seen >= count || Instant::now() >= deadline {
                return seen;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Items passed to single-item calls, in call order.
    pub fn seen_items(&self) -> Vec<String> {
        self.seen.lock().clone()
    }

    async fn play_item(&self, item: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(item.to_string());

        let (outcome, delay) = match self.per_item.get(item) {
            Some((outcome, delay)) => (outcome.clone(), delay.unwrap_or(self.delay)),
            None => (self.default.clone(), self.delay),
        };
        pause(delay).await;

        match outcome {
            Outcome::Echo => Ok(item.to_string()),
            Outcome::Value(value) => Ok(value),
            Outcome::Fail(reason) => Err(Error::Backend(reason)),
            Outcome::Hang => std::future::pending().await,
        }
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl PrimaryLookup for ScriptedLookup {
    async fn lookup(&self, item: &str) -> Result<String> {
        self.play_item(item).await
    }
}

#[async_trait]
impl SecondaryLookup for ScriptedLookup {
    async fn lookup(&self, item: &str) -> Result<String> {
        self.play_item(item).await
    }

    async fn lookup_batch(&self, items: &ItemSet) -> Result<ResolvedSet> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        pause(self.batch_delay).await;

        match self.batch.clone() {
            Outcome::Echo => Ok(items.clone()),
            Outcome::Value(value) => Ok(std::iter::once(value).collect()),
            Outcome::Fail(reason) => Err(Error::Backend(reason)),
            Outcome::Hang => std::future::pending().await,
        }
    }
}

/// A notification captured by `RecordingNotifier`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success { item: String, value: String },
    Failure { item: String, reason: String },
}

/// Notifier that keeps everything it is told.
#[derive(Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<Notification>>,
    fail_success: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `notify_success` fail after recording nothing.
    pub fn failing_success(mut self) -> Self {
        self.fail_success = true;
        self
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received.lock().clone()
    }

    /// Wait until at least `count` notifications arrived or `timeout` passed.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Notification> {
        let deadline = Instant::now() + timeout;
        loop {
            let snapshot = self.notifications();
            if snapshot.len() >= count || Instant::now() >= deadline {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_success(&self, item: &str, value: &str) -> Result<()> {
        if self.fail_success {
            return Err(Error::Notify(format!("store rejected '{}'", item)));
        }
        self.received.lock().push(Notification::Success {
            item: item.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    async fn notify_failure(&self, item: &str, reason: &str) -> Result<()> {
        self.received.lock().push(Notification::Failure {
            item: item.to_string(),
            reason: reason.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_per_item_script_overrides_default() {
        let lookup = ScriptedLookup::echo()
            .on("a", Outcome::Value("A".into()))
            .on("b", Outcome::Fail("nope".into()));

        assert_eq!(PrimaryLookup::lookup(&lookup, "a").await.unwrap(), "A");
        assert!(PrimaryLookup::lookup(&lookup, "b").await.is_err());
        assert_eq!(PrimaryLookup::lookup(&lookup, "c").await.unwrap(), "c");
        assert_eq!(lookup.calls(), 3);
        assert_eq!(lookup.seen_items(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_failing_covers_batch() {
        let lookup = ScriptedLookup::failing("down");
        let items: ItemSet = ["a".to_string()].into_iter().collect();
        assert!(lookup.lookup_batch(&items).await.is_err());
        assert_eq!(lookup.batch_calls(), 1);
        assert_eq!(lookup.calls(), 0);
    }

    #[tokio::test]
    async fn test_delay_is_applied() {
        let lookup = ScriptedLookup::echo().on_after("slow", Outcome::Echo, Duration::from_millis(50));
        let start = std::time::Instant::now();
        SecondaryLookup::lookup(&lookup, "slow").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_hang_never_completes() {
        let lookup = ScriptedLookup::echo().on("stuck", Outcome::Hang);
        let result = tokio::time::timeout(
            Duration::from_millis(30),
            PrimaryLookup::lookup(&lookup, "stuck"),
        )
        .await;
        assert!(result.is_err());
    }
}
