//! Fire-and-forget reporting of lookup outcomes.

use std::sync::Arc;

use async_trait::async_trait;
use dualsource_core::Result;
use tracing::{error, info, warn};

/// Receives the outcome of every reported lookup.
///
/// Implementations may fail; a failure never reaches the resolution that
/// triggered it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_success(&self, item: &str, value: &str) -> Result<()>;

    async fn notify_failure(&self, item: &str, reason: &str) -> Result<()>;
}

/// Notifier that only writes log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_success(&self, item: &str, value: &str) -> Result<()> {
        info!("Sending resolved value for '{}' to secondary store: {}", item, value);
        Ok(())
    }

    async fn notify_failure(&self, item: &str, reason: &str) -> Result<()> {
        error!("Resolution of '{}' finished in error: {}", item, reason);
        Ok(())
    }
}

/// Spawns notifications off the caller's path.
#[derive(Clone)]
pub struct NotifyHook {
    notifier: Arc<dyn Notifier>,
}

impl NotifyHook {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Report a primary lookup outcome: success as "sent", failure as "error".
    ///
    /// If sending the success fails, that failure is reported for the same item.
    pub fn report(&self, item: &str, outcome: &Result<String>) {
        match outcome {
            Ok(value) => self.report_success(item, value),
            Err(e) => self.report_failure(item, &e.to_string()),
        }
    }

    /// Report only failures; successes are not sent anywhere.
    pub fn report_if_failed(&self, item: &str, outcome: &Result<String>) {
        if let Err(e) = outcome {
            self.report_failure(item, &e.to_string());
        }
    }

    fn report_success(&self, item: &str, value: &str) {
        let notifier = self.notifier.clone();
        let item = item.to_string();
        let value = value.to_string();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify_success(&item, &value).await {
                let reason = e.to_string();
                if let Err(e) = notifier.notify_failure(&item, &reason).await {
                    warn!("Dropped failure notification for '{}': {}", item, e);
                }
            }
        });
    }

    fn report_failure(&self, item: &str, reason: &str) {
        let notifier = self.notifier.clone();
        let item = item.to_string();
        let reason = reason.to_string();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify_failure(&item, &reason).await {
                warn!("Dropped failure notification for '{}': {}", item, e);
            }
        });
    }
}
