use std::sync::Arc;

use crate::calculate::StatsEngine;
use crate::storage::StorageConfig;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<StorageConfig>,
    pub engine: Arc<StatsEngine>,
}

impl AppState {
    pub fn new(storage: StorageConfig, engine: StatsEngine) -> Self {
        Self {
            storage: Arc::new(storage),
            engine: Arc::new(engine),
        }
    }
}
