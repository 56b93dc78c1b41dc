// src/handlers/matchmaking.rs
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, error};
use uuid::Uuid;

use crate::config::Config;
use crate::error::ApiError;
use crate::handlers::session::KeyedLimiter;
use crate::identity::SessionIdentity;
use crate::matchmaking::MatchmakingQueryEngine;
use crate::models::filter::GameServerFilter;
use crate::utils::extract_peer_ip;

/// Per-IP limiter for the public listing endpoint.
pub struct ListLimiter(pub KeyedLimiter);

/// Public discovery endpoint. Deliberately requires no identity so any
/// third-party client can browse the server list.
pub async fn list_servers(
    req: HttpRequest,
    engine: web::Data<MatchmakingQueryEngine>,
    config: web::Data<Config>,
    filter: web::Json<GameServerFilter>,
    rate_limiter: web::Data<ListLimiter>,
) -> Result<HttpResponse, ApiError> {
    if let Some(peer_ip) = extract_peer_ip(&req) {
        if rate_limiter.0.check_key(&peer_ip).is_err() {
            error!("rate limit exceeded for server list from {}", peer_ip);
            return Err(ApiError::RateLimitExceeded);
        }
    }

    let mut servers = engine.list(&filter).await?;

    // Local test deployments announce everything on loopback so a client on
    // the same machine can actually join.
    if config.localhost_test {
        for server in &mut servers {
            server.server_address = "127.0.0.1".to_string();
        }
    }

    Ok(HttpResponse::Ok().json(servers))
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinQuery {
    account_id: Uuid,
}

/// Join notice from a client about to connect to a server. Acknowledged but
/// not verified; the authoritative roster arrives via the players endpoint.
pub async fn join_server(
    identity: SessionIdentity,
    path: web::Path<Uuid>,
    query: web::Query<JoinQuery>,
) -> Result<HttpResponse, ApiError> {
    debug!(
        "session {} announced player {} joining server {}",
        identity.session_id, query.account_id, path.into_inner()
    );
    Ok(HttpResponse::NoContent().finish())
}
