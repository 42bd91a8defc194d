use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::models::{ItemSummary, StoreEvent};

#[derive(Default)]
struct CacheState {
    generation: u64,
    summaries: Option<Arc<Vec<ItemSummary>>>,
}

/// Last computed item summaries, dropped whenever prices change.
///
/// Every invalidation bumps a generation counter. A rebuild records the
/// generation it started from and its result is discarded if an
/// invalidation happened in the meantime.
#[derive(Clone, Default)]
pub struct SummaryCache {
    state: Arc<RwLock<CacheState>>,
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<Vec<ItemSummary>>> {
        self.state.read().summaries.clone()
    }

    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    /// Returns whether the summaries were kept.
    pub fn store(&self, generation: u64, summaries: Arc<Vec<ItemSummary>>) -> bool {
        let mut state = self.state.write();
        if state.generation != generation {
            return false;
        }
        state.summaries = Some(summaries);
        true
    }

    pub fn invalidate(&self) {
        let mut state = self.state.write();
        state.generation += 1;
        state.summaries = None;
    }
}

/// Drops the cache on every item or price change until the event channel
/// closes.
pub fn spawn_invalidator(
    cache: SummaryCache,
    mut events: broadcast::Receiver<StoreEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(StoreEvent::Changed(event)) => {
                    debug!("{:?} {:?} for item {}, invalidating summaries",
                           event.table, event.operation, event.item_id);
                    cache.invalidate();
                }
                Ok(StoreEvent::Resync) => {
                    warn!("Store change feed was interrupted, invalidating summaries");
                    cache.invalidate();
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Summary invalidator lagged behind by {} price events", skipped);
                    cache.invalidate();
                }
                Err(RecvError::Closed) => {
                    info!("Price event channel closed, stopping summary invalidator");
                    break;
                }
            }
        }
    })
}
