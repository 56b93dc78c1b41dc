// src/trust.rs
use std::net::IpAddr;

use crate::models::server::TrustLevel;

/// What the registry knows about the registering connection at classification
/// time.
#[derive(Debug, Clone)]
pub struct ConnectionMetadata {
    pub peer_addr: IpAddr,
    /// A verified signing key would be grounds for elevation; none of the
    /// shipped policies consume one yet.
    pub signing_key: Option<String>,
}

/// Single extension point for trust policy. The registry only ever sees the
/// trait object, so a stronger policy slots in without touching registration.
pub trait TrustClassifier: Send + Sync {
    fn classify(&self, metadata: &ConnectionMetadata) -> TrustLevel;
}

/// Shipped policy: everything starts untrusted. Elevation happens out of
/// band.
pub struct DefaultTrustClassifier;

impl TrustClassifier for DefaultTrustClassifier {
    fn classify(&self, _metadata: &ConnectionMetadata) -> TrustLevel {
        TrustLevel::Untrusted
    }
}
