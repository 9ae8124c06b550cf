//! Read-only account lookups used by the booking front-end and admins.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use roombook_core::UserId;

use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

fn parse_user_id(raw: &str) -> Result<UserId, axum::response::Response> {
    raw.parse::<UserId>()
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()))
}

/// GET /users/:id
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_user_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.users.find_user_with_roles(id).await {
        Ok(Some(user)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "id": user.id,
                "username": user.username,
                "is_admin": user.is_admin,
                "is_frozen": user.is_frozen,
                "roles": user.roles,
            })),
        )
            .into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /admin/users/:id/permissions - effective permission codes of an account
pub async fn effective_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_user_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let user = match services.users.find_user_with_roles(id).await {
        Ok(Some(user)) => user,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    let mut permissions: Vec<String> = match services.users.expand_permissions(&user.roles).await {
        Ok(set) => set.into_iter().map(|p| p.as_str().to_string()).collect(),
        Err(e) => return errors::store_error_to_response(e),
    };
    permissions.sort();

    tracing::info!(caller = %caller.user_id(), target = %user.id, "effective permissions inspected");

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "user_id": user.id,
            "is_admin": user.is_admin,
            "roles": user.roles,
            "permissions": permissions,
        })),
    )
        .into_response()
}
