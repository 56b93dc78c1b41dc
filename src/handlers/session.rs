// src/handlers/session.rs
use actix_web::{web, HttpRequest, HttpResponse};
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::RateLimiter;
use log::{debug, error};
use std::net::IpAddr;
use uuid::Uuid;

use crate::error::ApiError;
use crate::identity::SessionIdentity;
use crate::models::server::{GameServerPayload, PlayerUpdate};
use crate::registry::{GameServerRegistry, RosterWrite};
use crate::utils::extract_peer_ip;

pub type KeyedLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// Per-IP limiter for the heartbeat endpoint. Newtype so it can coexist with
/// the listing limiter in app data.
pub struct HeartbeatLimiter(pub KeyedLimiter);

pub async fn register_server(
    req: HttpRequest,
    identity: SessionIdentity,
    registry: web::Data<GameServerRegistry>,
    payload: web::Json<GameServerPayload>,
) -> Result<HttpResponse, ApiError> {
    let peer_ip = extract_peer_ip(&req);
    debug!("register request from session {}", identity.session_id);

    let server = registry
        .register(identity, peer_ip, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(server))
}

pub async fn update_server(
    req: HttpRequest,
    identity: SessionIdentity,
    registry: web::Data<GameServerRegistry>,
    path: web::Path<Uuid>,
    payload: web::Json<GameServerPayload>,
) -> Result<HttpResponse, ApiError> {
    let peer_ip = extract_peer_ip(&req);
    let server = registry
        .update(identity, path.into_inner(), peer_ip, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(server))
}

pub async fn mark_ready(
    identity: SessionIdentity,
    registry: web::Data<GameServerRegistry>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    registry.mark_ready(identity, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn heartbeat(
    req: HttpRequest,
    identity: SessionIdentity,
    registry: web::Data<GameServerRegistry>,
    path: web::Path<Uuid>,
    rate_limiter: web::Data<HeartbeatLimiter>,
) -> Result<HttpResponse, ApiError> {
    if let Some(peer_ip) = extract_peer_ip(&req) {
        if rate_limiter.0.check_key(&peer_ip).is_err() {
            error!("rate limit exceeded for heartbeat from {}", peer_ip);
            return Err(ApiError::RateLimitExceeded);
        }
    }

    registry.heartbeat(identity, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn update_players(
    identity: SessionIdentity,
    registry: web::Data<GameServerRegistry>,
    path: web::Path<Uuid>,
    payload: web::Json<PlayerUpdate>,
) -> Result<HttpResponse, ApiError> {
    let write = registry
        .update_players(identity, path.into_inner(), payload.into_inner())
        .await?;
    match write {
        RosterWrite::Applied(server) => Ok(HttpResponse::Ok().json(server)),
        RosterWrite::IgnoredStaleOwnership => Ok(HttpResponse::NoContent().finish()),
    }
}

pub async fn remove_players(
    identity: SessionIdentity,
    registry: web::Data<GameServerRegistry>,
    path: web::Path<Uuid>,
    players: web::Json<Vec<Uuid>>,
) -> Result<HttpResponse, ApiError> {
    let server = registry
        .remove_players(identity, path.into_inner(), players.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(server))
}

pub async fn shutdown_server(
    identity: SessionIdentity,
    registry: web::Data<GameServerRegistry>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    registry.shutdown(identity, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
