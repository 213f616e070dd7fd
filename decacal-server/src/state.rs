use std::sync::Arc;

use anyhow::Result;
use decacal_core::backend::{Backend, LocalBackend};
use decacal_core::{CalendarSpec, CustomDate, DecacalConfig};
use tracing::warn;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LocalBackend>,
    pub spec: Arc<CalendarSpec>,
    /// Stored and returned the first time "today" is read.
    pub default_today: CustomDate,
}

impl AppState {
    pub fn new(store: LocalBackend, spec: CalendarSpec, default_today: CustomDate) -> Self {
        AppState {
            store: Arc::new(store),
            spec: Arc::new(spec),
            default_today,
        }
    }

    pub fn from_config(config: &DecacalConfig) -> Result<Self> {
        let store = LocalBackend::open(config.data_path())?;
        for warning in store.take_warnings() {
            warn!("{}", warning);
        }
        Ok(Self::new(store, config.spec()?, config.default_today()?))
    }
}
