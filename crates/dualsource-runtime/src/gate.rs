//! Delayed gate backed by a dedicated timer worker.
//!
//! The timer owns one OS thread running a current-thread tokio runtime. Its
//! only work is sleeping and firing oneshot signals, so no backend call or
//! request task can delay a gate.

use std::thread::JoinHandle;
use std::time::Duration;

use dualsource_core::{Error, Result};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, info};

/// Process-wide timer that arms gates.
pub struct GateTimer {
    handle: Handle,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl GateTimer {
    /// Spawn the timer thread.
    pub fn start() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        let handle = runtime.handle().clone();
        let (shutdown, stopped) = oneshot::channel::<()>();

        let thread = std::thread::Builder::new()
            .name("dualsource-gate-timer".to_string())
            .spawn(move || {
                runtime.block_on(async {
                    let _ = stopped.await;
                });
                debug!("Gate timer thread exiting");
            })?;

        info!("Gate timer started");
        Ok(Self {
            handle,
            shutdown: Some(shutdown),
            thread: Some(thread),
        })
    }

    /// Schedule a signal that fires once `duration` has elapsed from now.
    pub fn arm(&self, duration: Duration) -> Gate {
        let (fire, signal) = oneshot::channel();
        self.handle.spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = fire.send(());
        });
        Gate { signal }
    }
}

impl Drop for GateTimer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// A one-shot signal from `GateTimer::arm`.
#[derive(Debug)]
pub struct Gate {
    signal: oneshot::Receiver<()>,
}

impl Gate {
    /// Wait for the gate to fire. Fails if the timer stopped first.
    pub async fn fired(self) -> Result<()> {
        self.signal.await.map_err(|_| Error::TimerStopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_gate_waits_full_duration() {
        let timer = GateTimer::start().unwrap();
        let start = Instant::now();
        timer.arm(Duration::from_millis(60)).fired().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_gates_run_independently() {
        let timer = GateTimer::start().unwrap();
        let start = Instant::now();
        let long = timer.arm(Duration::from_millis(200));
        let short = timer.arm(Duration::from_millis(20));

        short.fired().await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(200));
        long.fired().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_gate_fires_while_caller_runtime_is_busy() {
        let timer = GateTimer::start().unwrap();
        let gate = timer.arm(Duration::from_millis(30));
        // Block this runtime's only worker; the timer thread keeps going.
        std::thread::sleep(Duration::from_millis(60));
        let start = Instant::now();
        gate.fired().await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_stopped_timer_fails_pending_gate() {
        let timer = GateTimer::start().unwrap();
        let gate = timer.arm(Duration::from_secs(60));
        drop(timer);
        assert!(matches!(gate.fired().await, Err(Error::TimerStopped)));
    }
}
