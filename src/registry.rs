// src/registry.rs
use log::{debug, error, info};
use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::error::ApiError;
use crate::identity::SessionIdentity;
use crate::models::server::{GameServer, GameServerPayload, PlayerUpdate};
use crate::storage::{SessionStore, StoreError};
use crate::trust::{ConnectionMetadata, TrustClassifier};
use crate::utils::{normalize_server_address, now_secs};

/// Outcome of a roster write. Ownership misses are an explicit no-op variant
/// instead of an error: a server mid-shutdown keeps pushing roster updates
/// after its record is gone, and that race is benign.
#[derive(Debug)]
pub enum RosterWrite {
    Applied(GameServer),
    IgnoredStaleOwnership,
}

/// Owns the full lifecycle of `GameServer` records. Every mutation is scoped
/// to the session that registered the record and goes through a versioned
/// read-modify-write against the store, so racing mutations on one record
/// never lose a write.
pub struct GameServerRegistry {
    store: Arc<dyn SessionStore>,
    trust: Arc<dyn TrustClassifier>,
    config: Config,
}

impl GameServerRegistry {
    pub fn new(
        store: Arc<dyn SessionStore>,
        trust: Arc<dyn TrustClassifier>,
        config: Config,
    ) -> Self {
        Self { store, trust, config }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Store calls never hang: anything slower than the configured bound
    /// surfaces as a server error.
    async fn store_call<T>(&self, fut: impl Future<Output = T>) -> Result<T, ApiError> {
        tokio::time::timeout(self.config.store_timeout(), fut)
            .await
            .map_err(|_| ApiError::Internal("session store call timed out".to_string()))
    }

    /// Ownership-scoped read-modify-write with bounded CAS retries. The
    /// closure is re-applied against a fresh fetch on every attempt.
    async fn mutate_owned<F>(
        &self,
        identity: SessionIdentity,
        id: Uuid,
        mut apply: F,
    ) -> Result<GameServer, ApiError>
    where
        F: FnMut(&mut GameServer),
    {
        let mut attempts = 0;
        loop {
            let fetched = self
                .store_call(self.store.fetch_owned(identity.session_id, id))
                .await?
                .ok_or(ApiError::NotFound)?;

            let mut server = fetched.server;
            apply(&mut server);
            server.last_updated = now_secs();

            match self
                .store_call(self.store.replace(fetched.version, server.clone()))
                .await?
            {
                Ok(()) => return Ok(server),
                Err(StoreError::Missing) => return Err(ApiError::NotFound),
                Err(StoreError::VersionMismatch) => {
                    attempts += 1;
                    if attempts > self.config.cas_retries {
                        return Err(ApiError::Conflict);
                    }
                    debug!("version conflict on server {}, retry {}", id, attempts);
                }
            }
        }
    }

    /// Creates a record bound to the caller's session. Trust and address are
    /// registry-controlled; whatever the payload carried for them is
    /// discarded.
    pub async fn register(
        &self,
        identity: SessionIdentity,
        peer_addr: Option<IpAddr>,
        payload: GameServerPayload,
    ) -> Result<GameServer, ApiError> {
        payload.validate().map_err(ApiError::BadRequest)?;

        let peer_addr = match peer_addr {
            Some(addr) => addr,
            None => {
                error!("could not determine address of registering game server");
                return Err(ApiError::Internal(
                    "could not determine game server address".to_string(),
                ));
            }
        };

        let metadata = ConnectionMetadata {
            peer_addr,
            signing_key: None,
        };
        let trust = self.trust.classify(&metadata);

        let mut server = GameServer {
            id: Uuid::new_v4(),
            session_id: identity.session_id,
            server_address: normalize_server_address(peer_addr),
            started: false,
            last_updated: now_secs(),
            trust_level: trust,
            public_players: payload.public_players.unwrap_or_default(),
            private_players: payload.private_players.unwrap_or_default(),
            attributes: payload.attributes,
        };
        server.stamp_trust(trust);

        self.store_call(self.store.insert(server.clone())).await?;
        info!(
            "registered game server {} at {} for session {}",
            server.id, server.server_address, identity.session_id
        );
        Ok(server)
    }

    /// Merges mutable fields onto the existing record. The address follows
    /// the same rule as registration (derived from the connection, never the
    /// body); attributes merge per-key with the inbound value winning, except
    /// the reserved trust key which is re-stamped from the stored trust
    /// level; rosters are replaced wholesale when present.
    pub async fn update(
        &self,
        identity: SessionIdentity,
        id: Uuid,
        peer_addr: Option<IpAddr>,
        payload: GameServerPayload,
    ) -> Result<GameServer, ApiError> {
        payload.validate().map_err(ApiError::BadRequest)?;
        let address = peer_addr.map(normalize_server_address);

        self.mutate_owned(identity, id, move |server| {
            if let Some(address) = &address {
                server.server_address = address.clone();
            }
            for (key, value) in &payload.attributes {
                server.attributes.insert(key.clone(), value.clone());
            }
            server.stamp_trust(server.trust_level);
            if let Some(public) = &payload.public_players {
                server.public_players = public.clone();
            }
            if let Some(private) = &payload.private_players {
                server.private_players = private.clone();
            }
        })
        .await
    }

    /// Monotone readiness transition; once started, a server never unstarts.
    pub async fn mark_ready(&self, identity: SessionIdentity, id: Uuid) -> Result<(), ApiError> {
        self.mutate_owned(identity, id, |server| {
            server.started = true;
        })
        .await
        .map(|_| ())
    }

    /// Refreshes `last_updated` and nothing else. Heartbeats are the sole
    /// liveness signal; a server that stops sending them gets evicted.
    pub async fn heartbeat(&self, identity: SessionIdentity, id: Uuid) -> Result<(), ApiError> {
        self.mutate_owned(identity, id, |_| {}).await.map(|_| ())
    }

    /// Wholesale roster replacement. An ownership miss is reported as
    /// `IgnoredStaleOwnership`, not an error.
    pub async fn update_players(
        &self,
        identity: SessionIdentity,
        id: Uuid,
        players: PlayerUpdate,
    ) -> Result<RosterWrite, ApiError> {
        let result = self
            .mutate_owned(identity, id, move |server| {
                server.public_players = players.public_players.clone();
                server.private_players = players.private_players.clone();
            })
            .await;

        match result {
            Ok(server) => Ok(RosterWrite::Applied(server)),
            Err(ApiError::NotFound) => {
                debug!(
                    "ignoring roster update for server {} not owned by session {}",
                    id, identity.session_id
                );
                Ok(RosterWrite::IgnoredStaleOwnership)
            }
            Err(e) => Err(e),
        }
    }

    /// Removes each listed player from both rosters; absent players are
    /// per-player no-ops.
    pub async fn remove_players(
        &self,
        identity: SessionIdentity,
        id: Uuid,
        players: Vec<Uuid>,
    ) -> Result<GameServer, ApiError> {
        self.mutate_owned(identity, id, move |server| {
            for player in &players {
                server.public_players.remove(player);
                server.private_players.remove(player);
            }
        })
        .await
    }

    /// Explicit deregistration on shutdown notice.
    pub async fn shutdown(&self, identity: SessionIdentity, id: Uuid) -> Result<(), ApiError> {
        let removed = self
            .store_call(self.store.remove(identity.session_id, id))
            .await?;
        if !removed {
            return Err(ApiError::NotFound);
        }
        info!("deregistered game server {} for session {}", id, identity.session_id);
        Ok(())
    }

    /// Delegated authorization for stats-blob writes: true iff the session
    /// currently owns a live server whose roster lists the player. Always
    /// evaluated against the store's current state, never a cached roster.
    pub async fn session_owns_server_with_player(
        &self,
        session_id: Uuid,
        player: Uuid,
    ) -> Result<bool, ApiError> {
        let now = now_secs();
        let servers = self.store_call(self.store.fetch_all()).await?;
        Ok(servers.iter().any(|server| {
            server.session_id == session_id
                && now.saturating_sub(server.last_updated) < self.config.stale_threshold_secs
                && server.has_player(&player)
        }))
    }
}
