// src/models/server.rs
use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::attributes::{AttributeMap, AttributeValue, TRUST_LEVEL_ATTRIBUTE};

const MAX_ATTRIBUTES: usize = 64;
const MAX_ATTRIBUTE_KEY_LEN: usize = 128;
const MAX_ATTRIBUTE_STRING_LEN: usize = 256;
const MAX_ROSTER_SIZE: usize = 512;

/// Trust assigned to a server at registration. Registry-controlled; a
/// registering server cannot pick its own level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrustLevel {
    Epic,
    Trusted,
    Untrusted,
}

impl TrustLevel {
    /// Numeric form stamped into the reserved attribute for filter matching.
    pub fn as_attribute(self) -> AttributeValue {
        let n = match self {
            Self::Epic => 0,
            Self::Trusted => 1,
            Self::Untrusted => 2,
        };
        AttributeValue::Int(n)
    }
}

/// One live announcement of a hostable match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameServer {
    pub id: Uuid,
    pub session_id: Uuid,
    pub server_address: String,
    pub started: bool,
    /// Unix seconds; refreshed by every accepted mutation and by heartbeat.
    pub last_updated: u64,
    pub trust_level: TrustLevel,
    pub public_players: BTreeSet<Uuid>,
    pub private_players: BTreeSet<Uuid>,
    pub attributes: AttributeMap,
}

impl GameServer {
    /// Listing identity: field-for-field equality over everything a client
    /// can see, ignoring the registry-stamped `id`, `session_id` and
    /// `last_updated`. A restarted server that re-registered before its stale
    /// record expired compares equal to that record under this rule.
    pub fn same_listing(&self, other: &GameServer) -> bool {
        self.server_address == other.server_address
            && self.started == other.started
            && self.trust_level == other.trust_level
            && self.public_players == other.public_players
            && self.private_players == other.private_players
            && self.attributes == other.attributes
    }

    /// Stamps the classified trust level onto the record, overwriting both
    /// the field and the reserved attribute regardless of inbound content.
    pub fn stamp_trust(&mut self, trust: TrustLevel) {
        self.trust_level = trust;
        self.attributes
            .insert(TRUST_LEVEL_ATTRIBUTE.to_string(), trust.as_attribute());
    }

    /// True if the player is anywhere on the current roster.
    pub fn has_player(&self, player: &Uuid) -> bool {
        self.public_players.contains(player) || self.private_players.contains(player)
    }
}

/// Mutable-field body for register and update calls. Identity, address,
/// started flag and trust content in an inbound body are ignored. Rosters are
/// optional so an update that omits them leaves the stored rosters alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameServerPayload {
    #[serde(default)]
    pub attributes: AttributeMap,
    #[serde(default)]
    pub public_players: Option<BTreeSet<Uuid>>,
    #[serde(default)]
    pub private_players: Option<BTreeSet<Uuid>>,
}

impl GameServerPayload {
    /// Structural validation shared by register and update. Returns the first
    /// violation as a message suitable for a BadRequest body.
    pub fn validate(&self) -> Result<(), String> {
        if self.attributes.len() > MAX_ATTRIBUTES {
            return Err(format!("too many attributes (max {MAX_ATTRIBUTES})"));
        }
        for (key, value) in &self.attributes {
            if key.is_empty() {
                return Err("attribute keys must be at least 1 char".to_string());
            }
            if key.len() > MAX_ATTRIBUTE_KEY_LEN {
                return Err(format!(
                    "attribute key too long (max {MAX_ATTRIBUTE_KEY_LEN} chars)"
                ));
            }
            if let AttributeValue::String(s) = value {
                if s.len() > MAX_ATTRIBUTE_STRING_LEN {
                    return Err(format!(
                        "attribute '{key}' value too long (max {MAX_ATTRIBUTE_STRING_LEN} chars)"
                    ));
                }
            }
        }
        for roster in [&self.public_players, &self.private_players].into_iter().flatten() {
            if roster.len() > MAX_ROSTER_SIZE {
                return Err(format!("roster too large (max {MAX_ROSTER_SIZE} players)"));
            }
        }
        Ok(())
    }
}

/// Wholesale roster replacement body for the players endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdate {
    #[serde(default)]
    pub public_players: BTreeSet<Uuid>,
    #[serde(default)]
    pub private_players: BTreeSet<Uuid>,
}
