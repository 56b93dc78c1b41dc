// src/models/filter.rs
use serde::Deserialize;

use crate::models::attributes::AttributeValue;
use crate::models::server::GameServer;

/// How a criterion compares the stored attribute against its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOp {
    Equal,
    NotEqual,
}

impl Default for FilterOp {
    fn default() -> Self {
        Self::Equal
    }
}

/// One attribute predicate. A criterion whose key is absent from a record's
/// attributes excludes the record, for either operator.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterCriterion {
    #[serde(rename = "criteria")]
    pub key: String,
    #[serde(rename = "type", default)]
    pub op: FilterOp,
    pub value: AttributeValue,
}

impl FilterCriterion {
    fn matches(&self, server: &GameServer) -> bool {
        match server.attributes.get(&self.key) {
            Some(stored) => match self.op {
                FilterOp::Equal => *stored == self.value,
                FilterOp::NotEqual => *stored != self.value,
            },
            None => false,
        }
    }
}

/// Listing query parameters, constructed per request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameServerFilter {
    #[serde(default)]
    pub criteria: Vec<FilterCriterion>,
    #[serde(default)]
    pub max_results: Option<usize>,
}

impl GameServerFilter {
    /// All criteria must hold. An empty filter matches everything.
    pub fn matches(&self, server: &GameServer) -> bool {
        self.criteria.iter().all(|c| c.matches(server))
    }
}
