use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde_json::json;

use roombook_auth::{AccessError, LoginError, StoreError};

/// Map a gate denial onto the HTTP surface.
///
/// A failed check is a 500, never a 401/403.
pub fn access_error_to_response(err: AccessError) -> axum::response::Response {
    match &err {
        AccessError::Unauthenticated(reason) => {
            let mut response = json_error(StatusCode::UNAUTHORIZED, err.code(), reason.clone());
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, header::HeaderValue::from_static("Bearer"));
            response
        }
        AccessError::Forbidden(reason) => json_error(StatusCode::FORBIDDEN, err.code(), reason.clone()),
        AccessError::AuthorizationCheckFailed(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            err.code(),
            "authorization could not be evaluated",
        ),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    tracing::error!(error = %err, "user store failure");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "user store failure")
}

pub fn login_error_to_response(err: LoginError) -> axum::response::Response {
    match err {
        LoginError::InvalidCredentials => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "invalid username or password",
        ),
        LoginError::Frozen => json_error(StatusCode::FORBIDDEN, "account_frozen", "account is frozen"),
        LoginError::Store(e) => store_error_to_response(e),
        LoginError::Password(e) => {
            tracing::error!(error = %e, "stored password hash unusable");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "login_failed", "login could not be completed")
        }
        LoginError::Token(e) => {
            tracing::error!(error = %e, "token signing failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "login_failed", "login could not be completed")
        }
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
