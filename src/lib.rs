// src/lib.rs
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod matchmaking;
pub mod models;
pub mod registry;
pub mod storage;
pub mod trust;
pub mod utils;

use actix_web::web;

/// Route table, shared between the binary and the integration tests. App data
/// (registry, engine, config, limiters) is registered by the caller.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/matchmaking")
            .route(
                "/session/matchMakingRequest",
                web::post().to(handlers::matchmaking::list_servers),
            )
            .route("/session", web::post().to(handlers::session::register_server))
            .route("/session/{id}", web::put().to(handlers::session::update_server))
            .route(
                "/session/{id}",
                web::delete().to(handlers::session::shutdown_server),
            )
            .route(
                "/session/{id}/start",
                web::post().to(handlers::session::mark_ready),
            )
            .route(
                "/session/{id}/heartbeat",
                web::post().to(handlers::session::heartbeat),
            )
            .route(
                "/session/{id}/players",
                web::post().to(handlers::session::update_players),
            )
            .route(
                "/session/{id}/players",
                web::delete().to(handlers::session::remove_players),
            )
            .route(
                "/session/{id}/join",
                web::post().to(handlers::matchmaking::join_server),
            ),
    )
    .route("/health", web::get().to(handlers::index::health));
}
