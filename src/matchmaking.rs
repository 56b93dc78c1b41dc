// src/matchmaking.rs
use log::debug;
use std::future::Future;
use std::sync::Arc;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::filter::GameServerFilter;
use crate::models::server::GameServer;
use crate::storage::SessionStore;
use crate::utils::now_secs;

/// Answers listing queries against the current store contents. Reads are
/// snapshot-consistent at best; the registry's writes may land mid-query and
/// that is fine. Records that stopped heartbeating are swept here, on read,
/// before the snapshot is taken.
pub struct MatchmakingQueryEngine {
    store: Arc<dyn SessionStore>,
    config: Config,
}

impl MatchmakingQueryEngine {
    pub fn new(store: Arc<dyn SessionStore>, config: Config) -> Self {
        Self { store, config }
    }

    async fn store_call<T>(&self, fut: impl Future<Output = T>) -> Result<T, ApiError> {
        tokio::time::timeout(self.config.store_timeout(), fut)
            .await
            .map_err(|_| ApiError::Internal("session store call timed out".to_string()))
    }

    /// Filter, dedup, order, cap. Ordering is registration order; among
    /// records that compare equal under the listing identity only the first
    /// survives.
    pub async fn list(&self, filter: &GameServerFilter) -> Result<Vec<GameServer>, ApiError> {
        let evicted = self
            .store_call(
                self.store
                    .evict_stale(now_secs(), self.config.stale_threshold_secs),
            )
            .await?;
        if evicted > 0 {
            debug!("evicted {} stale game servers", evicted);
        }

        let servers = self.store_call(self.store.fetch_all()).await?;

        let mut results: Vec<GameServer> = Vec::new();
        for server in servers {
            if !filter.matches(&server) {
                continue;
            }
            if results.iter().any(|kept| kept.same_listing(&server)) {
                continue;
            }
            results.push(server);
        }

        if let Some(max) = filter.max_results {
            results.truncate(max);
        }

        debug!("matchmaking query returned {} servers", results.len());
        Ok(results)
    }
}
