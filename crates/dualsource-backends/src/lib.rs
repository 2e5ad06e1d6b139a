//! DualSource Backends: lookup contracts and the resources around them.
//!
//! `PrimaryLookup` and `SecondaryLookup` abstract the two sources.
//! `Backends` runs every call on the worker pool of its class so a slow
//! source cannot starve the other. `NotifyHook` reports outcomes through a
//! `Notifier` without ever touching the resolved value.

pub mod adapters;
pub mod lookup;
pub mod notifier;
pub mod pool;
#[cfg(any(test, feature = "test-util"))]
pub mod scripted;
pub mod simulated;

pub use adapters::Backends;
pub use lookup::{PrimaryLookup, SecondaryLookup};
pub use notifier::{LogNotifier, Notifier, NotifyHook};
pub use pool::WorkerPool;
#[cfg(any(test, feature = "test-util"))]
pub use scripted::{Notification, Outcome, RecordingNotifier, ScriptedLookup};
pub use simulated::{SimulatedPrimary, SimulatedSecondary};
