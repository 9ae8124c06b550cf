//! `UserStore` adapters.
//!
//! The trait itself lives in `roombook-auth`; this module only provides
//! backends for it.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryUserStore;
pub use postgres::PostgresUserStore;
