// src/storage/memory.rs
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::models::server::GameServer;
use crate::storage::{SessionStore, StoreError, VersionedServer};

struct StoredServer {
    version: u64,
    server: GameServer,
}

/// In-memory session store. Per-record linearizability comes from doing the
/// version compare inside the map's entry lock; the `order` index preserves
/// registration order for listing.
pub struct MemoryStore {
    servers: DashMap<Uuid, StoredServer>,
    order: RwLock<Vec<Uuid>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            servers: DashMap::new(),
            order: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert(&self, server: GameServer) {
        let id = server.id;
        self.servers.insert(id, StoredServer { version: 1, server });
        self.order.write().push(id);
    }

    async fn fetch_owned(&self, session_id: Uuid, id: Uuid) -> Option<VersionedServer> {
        let entry = self.servers.get(&id)?;
        if entry.server.session_id != session_id {
            return None;
        }
        Some(VersionedServer {
            version: entry.version,
            server: entry.server.clone(),
        })
    }

    async fn fetch_all(&self) -> Vec<GameServer> {
        let order = self.order.read();
        order
            .iter()
            .filter_map(|id| self.servers.get(id).map(|e| e.server.clone()))
            .collect()
    }

    async fn replace(&self, expected_version: u64, server: GameServer) -> Result<(), StoreError> {
        match self.servers.get_mut(&server.id) {
            Some(mut entry) => {
                if entry.version != expected_version {
                    return Err(StoreError::VersionMismatch);
                }
                entry.version += 1;
                entry.server = server;
                Ok(())
            }
            None => Err(StoreError::Missing),
        }
    }

    async fn remove(&self, session_id: Uuid, id: Uuid) -> bool {
        let removed = self
            .servers
            .remove_if(&id, |_, stored| stored.server.session_id == session_id)
            .is_some();
        if removed {
            self.order.write().retain(|entry| *entry != id);
        }
        removed
    }

    async fn evict_stale(&self, now: u64, threshold_secs: u64) -> usize {
        // Counted inside the closure: diffing len() snapshots miscounts when
        // a concurrent insert lands mid-sweep.
        let mut evicted = 0;
        self.servers.retain(|_, stored| {
            let live = now.saturating_sub(stored.server.last_updated) < threshold_secs;
            if !live {
                evicted += 1;
            }
            live
        });
        if evicted > 0 {
            self.order.write().retain(|id| self.servers.contains_key(id));
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::models::attributes::AttributeMap;
    use crate::models::server::TrustLevel;

    fn record(session_id: Uuid, last_updated: u64) -> GameServer {
        GameServer {
            id: Uuid::new_v4(),
            session_id,
            server_address: "10.0.0.1".into(),
            started: false,
            last_updated,
            trust_level: TrustLevel::Untrusted,
            public_players: BTreeSet::new(),
            private_players: BTreeSet::new(),
            attributes: AttributeMap::new(),
        }
    }

    #[tokio::test]
    async fn fetch_owned_hides_records_of_other_sessions() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let server = record(owner, 100);
        let id = server.id;
        store.insert(server).await;

        assert!(store.fetch_owned(owner, id).await.is_some());
        assert!(store.fetch_owned(Uuid::new_v4(), id).await.is_none());
    }

    #[tokio::test]
    async fn replace_rejects_stale_version() {
        let store = MemoryStore::new();
        let server = record(Uuid::new_v4(), 100);
        let (session_id, id) = (server.session_id, server.id);
        store.insert(server).await;

        let fetched = store.fetch_owned(session_id, id).await.unwrap();
        store.replace(fetched.version, fetched.server.clone()).await.unwrap();
        assert_eq!(
            store.replace(fetched.version, fetched.server).await,
            Err(StoreError::VersionMismatch)
        );
    }

    #[tokio::test]
    async fn fetch_all_preserves_registration_order() {
        let store = MemoryStore::new();
        let session = Uuid::new_v4();
        let first = record(session, 100);
        let second = record(session, 100);
        let (a, b) = (first.id, second.id);
        store.insert(first).await;
        store.insert(second).await;

        let ids: Vec<Uuid> = store.fetch_all().await.into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[tokio::test]
    async fn evict_stale_drops_old_records_only() {
        let store = MemoryStore::new();
        let session = Uuid::new_v4();
        let fresh = record(session, 1_000);
        let stale = record(session, 100);
        let fresh_id = fresh.id;
        store.insert(stale).await;
        store.insert(fresh).await;

        assert_eq!(store.evict_stale(1_010, 300).await, 1);
        let remaining = store.fetch_all().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, fresh_id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn evict_stale_counts_exactly_under_concurrent_inserts() {
        use std::sync::Arc;

        let store = Arc::new(MemoryStore::new());
        let session = Uuid::new_v4();
        const STALE: usize = 500;
        const INSERTERS: usize = 4;
        const FRESH_PER_TASK: usize = 200;
        let now = 1_000_000;

        for _ in 0..STALE {
            store.insert(record(session, 0)).await;
        }

        let mut inserters = Vec::new();
        for _ in 0..INSERTERS {
            let store = Arc::clone(&store);
            inserters.push(tokio::spawn(async move {
                for _ in 0..FRESH_PER_TASK {
                    store.insert(record(Uuid::new_v4(), now)).await;
                }
            }));
        }
        let sweeper = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let mut total = 0;
                for _ in 0..200 {
                    total += store.evict_stale(now + 10, 300).await;
                }
                total
            })
        };

        for task in inserters {
            task.await.unwrap();
        }
        let evicted = sweeper.await.unwrap() + store.evict_stale(now + 10, 300).await;

        // Every stale record is evicted exactly once and no fresh record is
        // ever counted, no matter how inserts interleave with the sweeps.
        assert_eq!(evicted, STALE);
        let remaining = store.fetch_all().await;
        assert_eq!(remaining.len(), INSERTERS * FRESH_PER_TASK);
        assert!(remaining.iter().all(|s| s.last_updated == now));
    }

    #[tokio::test]
    async fn remove_is_ownership_scoped() {
        let store = MemoryStore::new();
        let server = record(Uuid::new_v4(), 100);
        let (session_id, id) = (server.session_id, server.id);
        store.insert(server).await;

        assert!(!store.remove(Uuid::new_v4(), id).await);
        assert!(store.remove(session_id, id).await);
        assert!(store.fetch_all().await.is_empty());
    }
}
