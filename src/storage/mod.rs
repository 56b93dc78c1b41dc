// src/storage/mod.rs
pub mod memory;

use async_trait::async_trait;
use std::fmt;
use uuid::Uuid;

use crate::models::server::GameServer;

/// A record together with the version the store knows it by. `replace` must
/// present this version back; a mismatch means someone else won the race.
#[derive(Debug, Clone)]
pub struct VersionedServer {
    pub version: u64,
    pub server: GameServer,
}

#[derive(Debug, PartialEq, Eq)]
pub enum StoreError {
    /// Compare-and-replace lost against a concurrent writer.
    VersionMismatch,
    /// The record disappeared between fetch and replace.
    Missing,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VersionMismatch => write!(f, "record version mismatch"),
            Self::Missing => write!(f, "record no longer exists"),
        }
    }
}

/// Durable keyed storage of `GameServer` records. Only the registry writes
/// through this contract. `fetch_owned` is the ownership capability: a session
/// that does not own a record cannot even observe it, so unauthorized
/// mutation is unrepresentable above this seam.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Inserts a freshly registered record at version 1, appended to
    /// registration order.
    async fn insert(&self, server: GameServer);

    /// Authoritative current state of the record, or nothing if `session_id`
    /// does not own it.
    async fn fetch_owned(&self, session_id: Uuid, id: Uuid) -> Option<VersionedServer>;

    /// Snapshot of all records in registration order. May lag concurrent
    /// writers; listing tolerates that.
    async fn fetch_all(&self) -> Vec<GameServer>;

    /// Atomic replace iff the stored version still equals `expected_version`.
    async fn replace(&self, expected_version: u64, server: GameServer) -> Result<(), StoreError>;

    /// Ownership-scoped delete; false if the session owns no such record.
    async fn remove(&self, session_id: Uuid, id: Uuid) -> bool;

    /// Drops every record whose `last_updated` is older than `now` minus the
    /// threshold. Returns how many were evicted.
    async fn evict_stale(&self, now: u64, threshold_secs: u64) -> usize;
}
