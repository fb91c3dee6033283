use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use imfo_core::DomainError;
use imfo_infra::{CollaboratorError, SessionError};

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
    }
}

pub fn session_error_to_response(err: SessionError) -> axum::response::Response {
    match err {
        SessionError::PackageLookup(CollaboratorError::NotFound(msg)) => {
            json_error(StatusCode::NOT_FOUND, "package_not_found", msg)
        }
        SessionError::PackageLookup(e) => {
            json_error(StatusCode::BAD_GATEWAY, "package_lookup_failed", e.to_string())
        }
        SessionError::Domain(e) => domain_error_to_response(e),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
