// tests/api.rs
//
// End-to-end coverage of the HTTP surface: identity enforcement, the
// register/update/heartbeat lifecycle, roster writes, and anonymous listing.
use std::sync::Arc;

use actix_web::{test, web, App};
use governor::RateLimiter;
use serde_json::{json, Value};
use uuid::Uuid;

use matchreg::config::Config;
use matchreg::handlers::matchmaking::ListLimiter;
use matchreg::handlers::session::HeartbeatLimiter;
use matchreg::matchmaking::MatchmakingQueryEngine;
use matchreg::models::server::GameServer;
use matchreg::registry::GameServerRegistry;
use matchreg::routes;
use matchreg::storage::memory::MemoryStore;
use matchreg::storage::SessionStore;
use matchreg::trust::DefaultTrustClassifier;

macro_rules! test_app {
    ($config:expr) => {{
        let config: Config = $config;
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
        let heartbeat_limiter = web::Data::new(HeartbeatLimiter(RateLimiter::keyed(
            config.heartbeat_quota(),
        )));
        let list_limiter = web::Data::new(ListLimiter(RateLimiter::keyed(
            config.server_list_quota(),
        )));
        test::init_service(
            App::new()
                .app_data(registry)
                .app_data(engine)
                .app_data(web::Data::new(config))
                .app_data(heartbeat_limiter)
                .app_data(list_limiter)
                .configure(routes),
        )
        .await
    }};
}

fn bearer(session: Uuid) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", session))
}

const FORWARDED: (&str, &str) = ("X-Forwarded-For", "203.0.113.9");

async fn register(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    session: Uuid,
    body: Value,
) -> GameServer {
    let req = test::TestRequest::post()
        .uri("/api/matchmaking/session")
        .insert_header(bearer(session))
        .insert_header(FORWARDED)
        .set_json(body)
        .to_request();
    test::call_and_read_body_json(app, req).await
}

#[actix_web::test]
async fn health_endpoint_is_open() {
    let app = test_app!(Config::default());
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn mutating_endpoints_require_identity() {
    let app = test_app!(Config::default());
    let req = test::TestRequest::post()
        .uri("/api/matchmaking/session")
        .insert_header(FORWARDED)
        .set_json(json!({"attributes": {}}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::post()
        .uri(&format!("/api/matchmaking/session/{}/heartbeat", Uuid::new_v4()))
        .insert_header(FORWARDED)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn register_binds_session_and_classifies_trust() {
    let app = test_app!(Config::default());
    let session = Uuid::new_v4();

    let server = register(
        &app,
        session,
        json!({"attributes": {"mode": "TDM", "players": 0, "SERVERTRUSTLEVEL_i": 0}}),
    )
    .await;

    assert_eq!(server.session_id, session);
    assert_eq!(server.server_address, "203.0.113.9");
    assert!(!server.started);
    // Client-supplied trust is discarded; everything starts untrusted.
    let body = serde_json::to_value(&server).unwrap();
    assert_eq!(body["trustLevel"], "Untrusted");
    assert_eq!(body["attributes"]["SERVERTRUSTLEVEL_i"], 2);
}

#[actix_web::test]
async fn register_without_determinable_address_is_server_error() {
    let app = test_app!(Config::default());
    let req = test::TestRequest::post()
        .uri("/api/matchmaking/session")
        .insert_header(bearer(Uuid::new_v4()))
        .set_json(json!({"attributes": {}}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);
}

#[actix_web::test]
async fn lifecycle_start_heartbeat_update() {
    let app = test_app!(Config::default());
    let session = Uuid::new_v4();
    let server = register(&app, session, json!({"attributes": {"mode": "DM"}})).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/matchmaking/session/{}/start", server.id))
        .insert_header(bearer(session))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 204);

    let req = test::TestRequest::post()
        .uri(&format!("/api/matchmaking/session/{}/heartbeat", server.id))
        .insert_header(bearer(session))
        .insert_header(FORWARDED)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 204);

    let req = test::TestRequest::put()
        .uri(&format!("/api/matchmaking/session/{}", server.id))
        .insert_header(bearer(session))
        .set_json(json!({"attributes": {"map": "outpost"}}))
        .to_request();
    let updated: GameServer = test::call_and_read_body_json(&app, req).await;
    assert!(updated.started);
    assert_eq!(updated.id, server.id);
    let body = serde_json::to_value(&updated).unwrap();
    assert_eq!(body["attributes"]["mode"], "DM");
    assert_eq!(body["attributes"]["map"], "outpost");
}

#[actix_web::test]
async fn update_from_another_session_is_not_found() {
    let app = test_app!(Config::default());
    let owner = Uuid::new_v4();
    let server = register(&app, owner, json!({"attributes": {"mode": "DM"}})).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/matchmaking/session/{}", server.id))
        .insert_header(bearer(Uuid::new_v4()))
        .set_json(json!({"attributes": {"mode": "CTF"}}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errorCode"], "errors.matchreg.session.not_found");
}

#[actix_web::test]
async fn roster_write_after_shutdown_is_silent_no_op() {
    let app = test_app!(Config::default());
    let session = Uuid::new_v4();
    let server = register(&app, session, json!({})).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/matchmaking/session/{}", server.id))
        .insert_header(bearer(session))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 204);

    let req = test::TestRequest::post()
        .uri(&format!("/api/matchmaking/session/{}/players", server.id))
        .insert_header(bearer(session))
        .set_json(json!({"publicPlayers": [Uuid::new_v4()], "privatePlayers": []}))
        .to_request();
    // 204, not an error: the record is already gone and the race is benign.
    assert_eq!(test::call_service(&app, req).await.status(), 204);
}

#[actix_web::test]
async fn roster_update_and_removal_round_trip() {
    let app = test_app!(Config::default());
    let session = Uuid::new_v4();
    let server = register(&app, session, json!({})).await;
    let p1 = Uuid::new_v4();
    let p2 = Uuid::new_v4();

    let req = test::TestRequest::post()
        .uri(&format!("/api/matchmaking/session/{}/players", server.id))
        .insert_header(bearer(session))
        .set_json(json!({"publicPlayers": [p1, p2], "privatePlayers": []}))
        .to_request();
    let after: GameServer = test::call_and_read_body_json(&app, req).await;
    assert_eq!(after.public_players.len(), 2);

    // Removing one present and one absent player succeeds and leaves p2.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/matchmaking/session/{}/players", server.id))
        .insert_header(bearer(session))
        .set_json(json!([p1, Uuid::new_v4()]))
        .to_request();
    let after: GameServer = test::call_and_read_body_json(&app, req).await;
    assert!(after.public_players.contains(&p2));
    assert_eq!(after.public_players.len(), 1);
}

#[actix_web::test]
async fn listing_is_anonymous_and_filtered() {
    let app = test_app!(Config::default());
    register(&app, Uuid::new_v4(), json!({"attributes": {"mode": "TDM", "players": 0}})).await;
    let dm = register(&app, Uuid::new_v4(), json!({"attributes": {"mode": "DM"}})).await;

    let req = test::TestRequest::post()
        .uri("/api/matchmaking/session/matchMakingRequest")
        .insert_header(FORWARDED)
        .set_json(json!({
            "criteria": [{"criteria": "mode", "type": "EQUAL", "value": "DM"}]
        }))
        .to_request();
    let results: Vec<GameServer> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, dm.id);
}

#[actix_web::test]
async fn listing_substitutes_loopback_in_localhost_test_mode() {
    let app = test_app!(Config {
        localhost_test: true,
        ..Config::default()
    });
    register(&app, Uuid::new_v4(), json!({"attributes": {"mode": "DM"}})).await;

    let req = test::TestRequest::post()
        .uri("/api/matchmaking/session/matchMakingRequest")
        .insert_header(FORWARDED)
        .set_json(json!({}))
        .to_request();
    let results: Vec<GameServer> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(results[0].server_address, "127.0.0.1");
}

#[actix_web::test]
async fn join_notice_is_acknowledged() {
    let app = test_app!(Config::default());
    let session = Uuid::new_v4();
    let server = register(&app, session, json!({})).await;

    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/matchmaking/session/{}/join?accountId={}",
            server.id,
            Uuid::new_v4()
        ))
        .insert_header(bearer(session))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 204);
}

#[actix_web::test]
async fn malformed_register_body_is_bad_request() {
    let app = test_app!(Config::default());
    let req = test::TestRequest::post()
        .uri("/api/matchmaking/session")
        .insert_header(bearer(Uuid::new_v4()))
        .insert_header(FORWARDED)
        .set_json(json!({"attributes": {"": "empty key"}}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}
