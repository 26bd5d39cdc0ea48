use axum::http::{HeaderValue, StatusCode, header};
use axum::response::IntoResponse;
use serde_json::json;

use userdesk_auth::AuthError;
use userdesk_core::DomainError;
use userdesk_infra::{MediaError, RepositoryError};

use crate::app::services::ServiceError;

pub const INCORRECT_CREDENTIALS: &str = "Incorrect username or password";
pub const INVALID_TOKEN: &str = "Could not validate credentials";

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Auth(AuthError::InvalidCredentials) => unauthorized(INCORRECT_CREDENTIALS),
        ServiceError::Auth(AuthError::InvalidToken(reason)) => {
            tracing::debug!("token rejected: {reason}");
            unauthorized(INVALID_TOKEN)
        }
        ServiceError::Auth(AuthError::Domain(e)) => domain_error_to_response(e),
        ServiceError::Repository(RepositoryError::Conflict(msg)) => {
            json_error(StatusCode::CONFLICT, "conflict", msg)
        }
        ServiceError::Repository(RepositoryError::NotFound(msg)) => {
            json_error(StatusCode::NOT_FOUND, "not_found", msg)
        }
        ServiceError::Media(MediaError::InvalidFilename(name)) => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation_error",
            format!("invalid upload filename {name:?}"),
        ),
        e @ (ServiceError::Auth(AuthError::Hashing(_) | AuthError::Signing(_))
        | ServiceError::Repository(RepositoryError::Backend(_))
        | ServiceError::Media(MediaError::Io { .. })) => internal_error(e),
    }
}

fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
    }
}

/// 500 with a generic body; the cause goes to the log only.
pub fn internal_error(err: impl std::fmt::Display) -> axum::response::Response {
    tracing::error!("request failed: {err}");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "internal server error",
    )
}

/// 401 carrying the `WWW-Authenticate: Bearer` challenge.
pub fn unauthorized(message: &'static str) -> axum::response::Response {
    let mut res = json_error(StatusCode::UNAUTHORIZED, "unauthorized", message);
    res.headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    res
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    let message = message.into();
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message,
            "detail": message,
        })),
    )
        .into_response()
}
