// src/handlers/index.rs
use actix_web::HttpResponse;

use crate::error::ApiError;

pub async fn health() -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .body("{\"status\": \"ok\"}"))
}
