use std::sync::Arc;

use axum::{
    extract::{MatchedPath, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{debug, error};

use roombook_auth::{AccessError, AccessGate, Decision};

use crate::app::errors;
use crate::authz::RouteTable;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct GateState {
    pub gate: AccessGate,
    pub routes: Arc<RouteTable>,
}

/// Runs the access gate in front of every matched route.
///
/// Must be installed with `route_layer` so `MatchedPath` is available. A
/// route without a table entry is refused, whatever the method.
pub async fn gate_middleware(
    State(state): State<GateState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let pattern = req.extensions().get::<MatchedPath>().map(|p| p.as_str().to_string());

    let Some(requirements) = pattern.as_deref().and_then(|p| state.routes.requirements(p)) else {
        error!(method = %req.method(), path = %req.uri().path(), "no access requirements registered for route");
        return errors::access_error_to_response(AccessError::check_failed(
            "no access requirements registered for route",
        ));
    };

    let bearer = extract_bearer(req.headers()).map(str::to_owned);

    match state.gate.decide(requirements, bearer.as_deref(), Utc::now()).await {
        Decision::Admitted(Some(principal)) => {
            req.extensions_mut().insert(PrincipalContext::new(principal));
        }
        Decision::Admitted(None) => {}
        Decision::Denied(err) => {
            debug!(method = %req.method(), route = pattern.as_deref().unwrap_or_default(), "request rejected by gate");
            return errors::access_error_to_response(err);
        }
    }

    next.run(req).await
}

/// `Authorization: Bearer <token>`; anything else counts as no credentials.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();

    if token.is_empty() { None } else { Some(token) }
}
