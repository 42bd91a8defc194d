use std::sync::Arc;

use crate::config::Config;
use crate::services::summary_cache::SummaryCache;
use crate::store::PriceStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PriceStore>,
    pub summary_cache: SummaryCache,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn PriceStore>, config: Config) -> Self {
        Self {
            store,
            summary_cache: SummaryCache::new(),
            config: Arc::new(config),
        }
    }
}
