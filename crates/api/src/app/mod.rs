//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: shared handles handed to handlers
//! - `routes/`: HTTP routes + handlers, registered with their access requirements
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use roombook_auth::{
    AccessGate, CredentialStore, Hs256JwtValidator, Hs256TokenIssuer, LoginService, UserStore,
};

use crate::config::ApiConfig;
use crate::middleware;

pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(
    config: &ApiConfig,
    store: Arc<dyn UserStore>,
    credentials: Arc<dyn CredentialStore>,
) -> Router {
    let validator =
        Arc::new(Hs256JwtValidator::new(config.jwt_secret.as_bytes()).with_leeway(config.token_leeway));
    let gate = AccessGate::new(validator, store.clone(), config.freeze_policy);

    let (routes, table) = routes::router().into_parts();
    let gate_state = middleware::GateState {
        gate,
        routes: Arc::new(table),
    };

    let issuer = Hs256TokenIssuer::new(config.jwt_secret.as_bytes(), config.token_ttl);
    let login = LoginService::new(credentials, issuer);
    let services = Arc::new(services::AppServices::new(store, login));

    routes
        .route_layer(axum::middleware::from_fn_with_state(
            gate_state,
            middleware::gate_middleware,
        ))
        .layer(Extension(services))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
