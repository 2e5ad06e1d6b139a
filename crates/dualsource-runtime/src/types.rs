//! Runtime types.

use dualsource_core::OrchestrationConfig;
use serde::Serialize;

/// How a request is resolved, chosen from its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolvePath {
    /// Nothing to resolve; no backend is called.
    Empty,
    /// One primary/secondary race per item.
    PerItem,
    /// One race between the aggregated primaries and the secondary batch call.
    Batch,
}

impl ResolvePath {
    pub fn for_size(size: usize, threshold: usize) -> Self {
        if size == 0 {
            Self::Empty
        } else if size > threshold {
            Self::Batch
        } else {
            Self::PerItem
        }
    }
}

/// Which side of a race supplied the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    Primary,
    Secondary,
}

/// Result of a race together with the branch that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decided<T> {
    pub branch: Branch,
    pub value: T,
}

/// Runtime status information.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeStatus {
    pub config: OrchestrationConfig,
    #[serde(rename = "primaryPoolAvailable")]
    pub primary_pool_available: usize,
    #[serde(rename = "secondaryPoolAvailable")]
    pub secondary_pool_available: usize,
}
