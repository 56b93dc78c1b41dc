// src/models/attributes.rs
use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

/// Attribute key the registry owns. Whatever a server sends under this key is
/// discarded and re-stamped from the classified trust level.
pub const TRUST_LEVEL_ATTRIBUTE: &str = "SERVERTRUSTLEVEL_i";

/// One value in a server's open attribute bag. Untagged so the wire form is a
/// plain JSON scalar; integral numbers decode as `Int`, anything fractional as
/// `Double`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

/// Open, case-sensitive key/value bag. The registry assumes no schema beyond
/// the reserved trust key.
pub type AttributeMap = BTreeMap<String, AttributeValue>;
