// src/main.rs
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use env_logger::Env;
use governor::RateLimiter;
use log::info;

use matchreg::config::Config;
use matchreg::handlers::matchmaking::ListLimiter;
use matchreg::handlers::session::HeartbeatLimiter;
use matchreg::matchmaking::MatchmakingQueryEngine;
use matchreg::registry::GameServerRegistry;
use matchreg::routes;
use matchreg::storage::memory::MemoryStore;
use matchreg::storage::SessionStore;
use matchreg::trust::DefaultTrustClassifier;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    dotenv::dotenv().ok();

    let config = Config::from_env();

    let bind_address = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind = format!("{}:{}", bind_address, port);

    let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::new());
    let registry = web::Data::new(GameServerRegistry::new(
        Arc::clone(&store),
        Arc::new(DefaultTrustClassifier),
        config.clone(),
    ));
    let engine = web::Data::new(MatchmakingQueryEngine::new(
        Arc::clone(&store),
        config.clone(),
    ));

    let heartbeat_rate_limiter = web::Data::new(HeartbeatLimiter(RateLimiter::keyed(
        config.heartbeat_quota(),
    )));
    let server_list_rate_limiter = web::Data::new(ListLimiter(RateLimiter::keyed(
        config.server_list_quota(),
    )));
    let config_data = web::Data::new(config);

    info!("starting master server on {}", bind);
    HttpServer::new(move || {
        App::new()
            .app_data(registry.clone())
            .app_data(engine.clone())
            .app_data(config_data.clone())
            .app_data(heartbeat_rate_limiter.clone())
            .app_data(server_list_rate_limiter.clone())
            .configure(routes)
    })
    .bind(&bind)?
    .run()
    .await
}
