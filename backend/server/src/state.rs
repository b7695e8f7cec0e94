use std::sync::Arc;

use pantry::{Store, StoreError};

use super::config::Config;

pub struct AppState {
    pub config: Config,
    pub store: Store,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>, StoreError> {
        let store = Store::open(&config.database_path)?;

        Ok(Arc::new(Self { config, store }))
    }
}
