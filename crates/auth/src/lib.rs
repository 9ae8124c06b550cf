//! `roombook-auth` — bearer-token authentication and role/permission authorization.
//!
//! Decoupled from HTTP and from any particular database: the API layer feeds
//! the [`AccessGate`] a raw bearer token, and storage is reached through the
//! [`UserStore`] trait. Tokens are minted by [`LoginService`] after a
//! password check against a [`CredentialStore`].

pub mod authorize;
pub mod claims;
pub mod gate;
pub mod login;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod requirement;
pub mod resolve;
pub mod roles;
pub mod store;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;

pub use authorize::{AccessError, has_any_role, has_permission};
pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use gate::{AccessGate, Decision};
pub use login::{IssuedToken, LoginError, LoginService};
pub use password::{PasswordError, hash_password, verify_password};
pub use permissions::Permission;
pub use principal::{Principal, UserRecord};
pub use requirement::{Requirement, Requirements};
pub use resolve::{FreezePolicy, PrincipalResolver};
pub use roles::Role;
pub use store::{CredentialStore, StoreError, StoredCredentials, UserStore};
pub use token::{Hs256JwtValidator, Hs256TokenIssuer, JwtValidator, TokenError};
