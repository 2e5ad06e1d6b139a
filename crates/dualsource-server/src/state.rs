//! Shared application state.

use std::sync::Arc;

use dualsource_backends::{Notifier, PrimaryLookup, SecondaryLookup};
use dualsource_core::{DualSourceConfig, Result};
use dualsource_runtime::Orchestrator;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: DualSourceConfig,
    pub orchestrator: Orchestrator,
}

impl AppState {
    pub fn new(
        config: DualSourceConfig,
        primary: Arc<dyn PrimaryLookup>,
        secondary: Arc<dyn SecondaryLookup>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let orchestrator = Orchestrator::new(config.orchestration.clone(), primary, secondary, notifier)?;
        Ok(Self {
            config,
            orchestrator,
        })
    }
}
