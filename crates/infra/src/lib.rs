//! Infrastructure layer: persistence adapters for the user/role/permission graph.

pub mod user_store;

pub use user_store::{InMemoryUserStore, PostgresUserStore};
