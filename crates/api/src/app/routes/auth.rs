//! Password login.

use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::Deserialize;

use crate::app::{errors, services::AppServices};

const USERNAME_LEN: std::ops::RangeInclusive<usize> = 2..=50;
const PASSWORD_LEN: std::ops::RangeInclusive<usize> = 6..=50;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /auth/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> axum::response::Response {
    if !USERNAME_LEN.contains(&body.username.chars().count()) {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "username must be 2 to 50 characters",
        );
    }
    if !PASSWORD_LEN.contains(&body.password.chars().count()) {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "password must be 6 to 50 characters",
        );
    }

    match services.login.login(&body.username, &body.password, Utc::now()).await {
        Ok(issued) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "id": issued.user.id,
                "username": issued.user.username,
                "is_admin": issued.user.is_admin,
                "roles": issued.user.roles,
                "token": issued.token,
                "expires_at": issued.expires_at.timestamp(),
            })),
        )
            .into_response(),
        Err(e) => errors::login_error_to_response(e),
    }
}
