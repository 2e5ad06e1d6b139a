//! DualSource Core: error type, configuration, resolution model.

pub mod config;
pub mod error;
pub mod resolution;

pub use config::{DualSourceConfig, OrchestrationConfig, MAX_POOL_SIZE};
pub use error::{Error, Result};
pub use resolution::{collect_present, ItemSet, ResolvedSet, Resolution};
