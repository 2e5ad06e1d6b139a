//! DualSource Runtime: the orchestration engine.
//!
//! Each item is resolved by racing a primary lookup against a secondary
//! lookup that may not complete before a grace period has elapsed. Large
//! requests race the aggregated primaries against a single secondary batch
//! call instead.

pub mod batch;
pub mod gate;
pub mod item;
pub mod orchestrator;
pub mod race;
pub mod types;

pub use batch::BatchResolver;
pub use gate::{Gate, GateTimer};
pub use item::ItemResolver;
pub use orchestrator::Orchestrator;
pub use types::*;
