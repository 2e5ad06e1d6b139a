//! First-completion race between a primary and a secondary branch.

use dualsource_core::{Error, Result};
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

use crate::types::{Branch, Decided};

/// Decide between two running branches.
///
/// The decision is taken once, when the first branch completes: if the
/// primary branch has finished at that instant and `accept` approves its
/// value, the primary wins. Otherwise the secondary result is used, waiting
/// for it if needed. A primary that is still running never wins, even if it
/// finishes while the secondary is being awaited.
///
/// A panicked primary counts as `T::default()`. A panicked secondary, or a
/// secondary that returns an error, is an orchestration fault.
pub async fn race<T, F>(
    mut primary: JoinHandle<T>,
    mut secondary: JoinHandle<Result<T>>,
    accept: F,
) -> Result<Decided<T>>
where
    T: Default,
    F: Fn(&T) -> bool,
{
    tokio::select! {
        settled = &mut primary => {
            let value = primary_value(settled);
            if accept(&value) {
                info!("Got successful response from primary");
                return Ok(Decided { branch: Branch::Primary, value });
            }
            secondary_value(secondary.await)
        }
        settled = &mut secondary => {
            if primary.is_finished() {
                let value = primary_value(primary.await);
                if accept(&value) {
                    info!("Got successful response from primary");
                    return Ok(Decided { branch: Branch::Primary, value });
                }
            }
            secondary_value(settled)
        }
    }
}

fn primary_value<T: Default>(settled: std::result::Result<T, JoinError>) -> T {
    settled.unwrap_or_else(|e| {
        error!("Primary branch aborted: {}", e);
        T::default()
    })
}

fn secondary_value<T>(settled: std::result::Result<Result<T>, JoinError>) -> Result<Decided<T>> {
    let value = settled.map_err(|e| Error::Task(format!("secondary branch: {}", e)))??;
    Ok(Decided {
        branch: Branch::Secondary,
        value,
    })
}
