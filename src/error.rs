// src/error.rs
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

/// Caller-visible failure taxonomy. Ownership misses on roster writes are the
/// one case deliberately not surfaced through this type; see
/// `registry::RosterWrite`.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    BadRequest(String),
    NotFound,
    Conflict,
    RateLimitExceeded,
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "missing or invalid session identity"),
            Self::BadRequest(msg) => write!(f, "bad request: {}", msg),
            Self::NotFound => write!(f, "no such server owned by this session"),
            Self::Conflict => write!(f, "concurrent update conflict, retries exhausted"),
            Self::RateLimitExceeded => write!(f, "rate limit exceeded"),
            Self::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "errors.matchreg.common.unauthorized",
            Self::BadRequest(_) => "errors.matchreg.common.bad_request",
            Self::NotFound => "errors.matchreg.session.not_found",
            Self::Conflict => "errors.matchreg.session.conflict",
            Self::RateLimitExceeded => "errors.matchreg.common.throttled",
            Self::Internal(_) => "errors.matchreg.common.server_error",
        }
    }

    fn numeric_code(&self) -> u32 {
        match self {
            Self::Unauthorized => 1001,
            Self::BadRequest(_) => 1002,
            Self::NotFound => 1003,
            Self::Conflict => 1004,
            Self::RateLimitExceeded => 1005,
            Self::Internal(_) => 1000,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "errorCode": self.error_code(),
            "errorMessage": self.to_string(),
            "numericErrorCode": self.numeric_code(),
        }))
    }
}
