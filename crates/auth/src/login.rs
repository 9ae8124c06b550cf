//! Password login: the one place bearer tokens are issued.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::password::{PasswordError, verify_password};
use crate::store::{CredentialStore, StoreError};
use crate::token::{Hs256TokenIssuer, TokenError};
use crate::UserRecord;

#[derive(Debug, Error)]
pub enum LoginError {
    /// Unknown username or wrong password; the two are not told apart.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("account is frozen")]
    Frozen,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub user: UserRecord,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct LoginService {
    credentials: Arc<dyn CredentialStore>,
    issuer: Hs256TokenIssuer,
}

impl LoginService {
    pub fn new(credentials: Arc<dyn CredentialStore>, issuer: Hs256TokenIssuer) -> Self {
        Self { credentials, issuer }
    }

    /// Check the password, then the freeze flag, then sign a token valid from
    /// `now` for the issuer's TTL.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, LoginError> {
        let Some(stored) = self.credentials.find_credentials(username).await? else {
            debug!(username, "login for unknown account");
            return Err(LoginError::InvalidCredentials);
        };

        if !verify_password(password, &stored.password_hash)? {
            debug!(user_id = %stored.user.id, "login with wrong password");
            return Err(LoginError::InvalidCredentials);
        }

        if stored.user.is_frozen {
            info!(user_id = %stored.user.id, "login refused for frozen account");
            return Err(LoginError::Frozen);
        }

        let token = self.issuer.issue(&stored.user, now)?;
        info!(user_id = %stored.user.id, "token issued");

        Ok(IssuedToken {
            user: stored.user,
            token,
            expires_at: now + self.issuer.ttl(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::testing::StubStore;
    use crate::{Hs256JwtValidator, JwtValidator};

    const SECRET: &str = "login-secret";

    fn service(store: StubStore) -> LoginService {
        LoginService::new(
            Arc::new(store),
            Hs256TokenIssuer::new(SECRET, Duration::minutes(15)),
        )
    }

    #[tokio::test]
    async fn issues_token_the_verifier_accepts() {
        let now = Utc::now();
        let login = service(StubStore::default().user(42, "alice", false, &["viewer"]).password(42, "hunter22"));

        let issued = login.login("alice", "hunter22", now).await.unwrap();

        assert_eq!(issued.user.username, "alice");
        assert_eq!(issued.expires_at, now + Duration::minutes(15));
        let claims = Hs256JwtValidator::new(SECRET).validate(&issued.token, now).unwrap();
        assert_eq!(claims.sub, issued.user.id);
        assert!(
            Hs256JwtValidator::new(SECRET)
                .validate(&issued.token, now + Duration::minutes(16))
                .is_err()
        );
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let login = service(StubStore::default().user(42, "alice", false, &[]).password(42, "hunter22"));

        let wrong = login.login("alice", "hunter23", Utc::now()).await.unwrap_err();
        let unknown = login.login("mallory", "hunter22", Utc::now()).await.unwrap_err();

        assert!(matches!(wrong, LoginError::InvalidCredentials));
        assert!(matches!(unknown, LoginError::InvalidCredentials));
    }

    #[tokio::test]
    async fn frozen_account_cannot_log_in() {
        let login = service(
            StubStore::default()
                .user(8, "frank", false, &[])
                .frozen(8)
                .password(8, "hunter22"),
        );

        let err = login.login("frank", "hunter22", Utc::now()).await.unwrap_err();
        assert!(matches!(err, LoginError::Frozen));
    }

    #[tokio::test]
    async fn frozen_account_with_wrong_password_is_invalid_credentials() {
        let login = service(
            StubStore::default()
                .user(8, "frank", false, &[])
                .frozen(8)
                .password(8, "hunter22"),
        );

        let err = login.login("frank", "nope", Utc::now()).await.unwrap_err();
        assert!(matches!(err, LoginError::InvalidCredentials));
    }

    #[tokio::test]
    async fn store_fault_is_not_a_credential_failure() {
        let store = StubStore {
            fail_lookups: true,
            ..StubStore::default()
        };

        let err = service(store).login("alice", "hunter22", Utc::now()).await.unwrap_err();
        assert!(matches!(err, LoginError::Store(_)));
    }
}
