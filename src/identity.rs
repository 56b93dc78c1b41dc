// src/identity.rs
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::ApiError;

/// Authenticated game-server session, produced by the external auth service
/// and presented as a bearer token. Every mutating registry call is scoped to
/// this session; the registry never validates credentials itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionIdentity {
    pub session_id: Uuid,
}

impl SessionIdentity {
    pub fn new(session_id: Uuid) -> Self {
        Self { session_id }
    }

    fn from_http(req: &HttpRequest) -> Result<Self, ApiError> {
        let header = req
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or(ApiError::Unauthorized)?;
        let session_id = token.trim().parse::<Uuid>().map_err(|_| ApiError::Unauthorized)?;
        Ok(Self { session_id })
    }
}

impl FromRequest for SessionIdentity {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_http(req))
    }
}
