//! HTTP API: configuration, access gate middleware, routing.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;
