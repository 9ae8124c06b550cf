//! Bearer token signing and verification (HS256).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{TokenClaims, TokenValidationError, validate_claims};
use crate::principal::UserRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Malformed token, wrong algorithm or bad signature.
    #[error("invalid token: {0}")]
    Invalid(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Credential verifier: signature check plus claim-window validation.
///
/// Implementations must be pure functions of `(token, now, key)`.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError>;
}

/// Shared-secret HS256 verifier.
#[derive(Clone)]
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
    leeway: Duration,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time checks run in `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
            leeway: Duration::zero(),
        }
    }

    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Invalid("empty token".to_string()));
        }

        let claims = jsonwebtoken::decode::<TokenClaims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        validate_claims(&claims, now, self.leeway)?;
        Ok(claims)
    }
}

/// Signs tokens the [`Hs256JwtValidator`] accepts unmodified.
///
/// Driven by [`LoginService`](crate::LoginService); the gate never calls this.
#[derive(Clone)]
pub struct Hs256TokenIssuer {
    key: EncodingKey,
    ttl: Duration,
}

impl Hs256TokenIssuer {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_ref()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn claims_for(&self, user: &UserRecord, now: DateTime<Utc>) -> TokenClaims {
        TokenClaims {
            sub: user.id,
            username: user.username.clone(),
            is_admin: user.is_admin,
            issued_at: now,
            expires_at: now + self.ttl,
        }
    }

    pub fn issue(&self, user: &UserRecord, now: DateTime<Utc>) -> Result<String, TokenError> {
        self.sign(&self.claims_for(user, now))
    }

    pub fn sign(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use roombook_core::UserId;

    fn alice() -> UserRecord {
        UserRecord {
            id: UserId::new(42),
            username: "alice".to_string(),
            roles: vec![Role::new("viewer")],
            is_frozen: false,
            is_admin: false,
        }
    }

    #[test]
    fn issued_token_verifies() {
        let now = Utc::now();
        let issuer = Hs256TokenIssuer::new("test-secret", Duration::hours(1));
        let validator = Hs256JwtValidator::new("test-secret");

        let token = issuer.issue(&alice(), now).unwrap();
        let claims = validator.validate(&token, now).unwrap();

        assert_eq!(claims.sub, UserId::new(42));
        assert_eq!(claims.username, "alice");
        assert!(!claims.is_admin);
    }

    #[test]
    fn verification_is_time_dependent() {
        let now = Utc::now();
        let ttl = Duration::minutes(30);
        let issuer = Hs256TokenIssuer::new("test-secret", ttl);
        let validator = Hs256JwtValidator::new("test-secret");
        let token = issuer.issue(&alice(), now).unwrap();

        assert!(validator.validate(&token, now).is_ok());
        assert!(validator.validate(&token, now).is_ok());
        assert_eq!(
            validator.validate(&token, now + ttl + Duration::seconds(1)),
            Err(TokenError::Claims(TokenValidationError::Expired))
        );
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let now = Utc::now();
        let token = Hs256TokenIssuer::new("secret1", Duration::hours(1))
            .issue(&alice(), now)
            .unwrap();

        let result = Hs256JwtValidator::new("secret2").validate(&token, now);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        let validator = Hs256JwtValidator::new("test-secret");
        assert!(matches!(
            validator.validate("not-a-jwt", Utc::now()),
            Err(TokenError::Invalid(_))
        ));
        assert!(matches!(
            validator.validate("", Utc::now()),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn other_algorithms_are_rejected() {
        let now = Utc::now();
        let issuer = Hs256TokenIssuer::new("test-secret", Duration::hours(1));
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &issuer.claims_for(&alice(), now),
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let result = Hs256JwtValidator::new("test-secret").validate(&token, now);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn integer_subject_verifies() {
        let now = Utc::now();
        let payload = serde_json::json!({
            "sub": 42,
            "username": "alice",
            "is_admin": false,
            "iat": now.timestamp(),
            "exp": (now + Duration::hours(1)).timestamp(),
        });
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let claims = Hs256JwtValidator::new("test-secret").validate(&token, now).unwrap();
        assert_eq!(claims.sub, UserId::new(42));
    }
}
