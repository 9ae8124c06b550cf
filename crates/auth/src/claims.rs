use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use roombook_core::UserId;

/// Bearer token claims.
///
/// Registered claim names are used on the wire (`sub`, `iat`, `exp`), with
/// timestamps as unix seconds so any standard JWT library can read them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user account the token was issued to.
    #[serde(with = "subject")]
    pub sub: UserId,

    /// Username at issuance time (informational; roles are re-read per request).
    pub username: String,

    /// Administrator flag at issuance time.
    pub is_admin: bool,

    /// Issued-at timestamp.
    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Validate the time window of already-decoded claims.
///
/// `leeway` widens both ends of the window to absorb clock skew between the
/// issuer and this process.
pub fn validate_claims(
    claims: &TokenClaims,
    now: DateTime<Utc>,
    leeway: Duration,
) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now + leeway < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at + leeway {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

/// `sub` is written as a string per RFC 7519; account keys are integers, and
/// tokens carrying the bare integer are accepted too.
mod subject {
    use core::fmt;

    use serde::{Deserializer, Serializer, de};

    use roombook_core::UserId;

    pub fn serialize<S: Serializer>(id: &UserId, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<UserId, D::Error> {
        deserializer.deserialize_any(SubjectVisitor)
    }

    struct SubjectVisitor;

    impl<'de> de::Visitor<'de> for SubjectVisitor {
        type Value = UserId;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a user id as a decimal string or an integer")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<UserId, E> {
            v.parse().map_err(E::custom)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<UserId, E> {
            Ok(UserId::new(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<UserId, E> {
            i64::try_from(v)
                .map(UserId::new)
                .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_at(issued_at: DateTime<Utc>, ttl: Duration) -> TokenClaims {
        TokenClaims {
            sub: UserId::new(42),
            username: "alice".to_string(),
            is_admin: false,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    #[test]
    fn valid_inside_window() {
        let t = Utc::now();
        let claims = claims_at(t, Duration::minutes(10));
        assert_eq!(validate_claims(&claims, t, Duration::zero()), Ok(()));
        assert_eq!(
            validate_claims(&claims, t + Duration::minutes(9), Duration::zero()),
            Ok(())
        );
    }

    #[test]
    fn expired_after_ttl() {
        let t = Utc::now();
        let ttl = Duration::minutes(10);
        let claims = claims_at(t, ttl);
        assert_eq!(
            validate_claims(&claims, t + ttl + Duration::seconds(1), Duration::zero()),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn leeway_extends_expiry() {
        let t = Utc::now();
        let ttl = Duration::minutes(10);
        let claims = claims_at(t, ttl);
        let later = t + ttl + Duration::seconds(5);
        assert!(validate_claims(&claims, later, Duration::seconds(30)).is_ok());
    }

    #[test]
    fn issued_in_future_is_rejected() {
        let t = Utc::now();
        let claims = claims_at(t + Duration::hours(1), Duration::minutes(10));
        assert_eq!(
            validate_claims(&claims, t, Duration::zero()),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn inverted_window_is_rejected() {
        let t = Utc::now();
        let claims = claims_at(t, Duration::zero());
        assert_eq!(
            validate_claims(&claims, t, Duration::zero()),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn wire_format_uses_registered_claim_names() {
        let t = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let claims = claims_at(t, Duration::seconds(60));
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["sub"], "42");
        assert_eq!(json["iat"], 1_700_000_000);
        assert_eq!(json["exp"], 1_700_000_060);
        assert_eq!(json["is_admin"], false);
    }

    #[test]
    fn subject_accepts_string_or_integer() {
        let mut json = serde_json::json!({
            "sub": "42",
            "username": "alice",
            "is_admin": false,
            "iat": 1_700_000_000,
            "exp": 1_700_000_060,
        });
        let from_string: TokenClaims = serde_json::from_value(json.clone()).unwrap();

        json["sub"] = serde_json::json!(42);
        let from_integer: TokenClaims = serde_json::from_value(json.clone()).unwrap();

        assert_eq!(from_string.sub, UserId::new(42));
        assert_eq!(from_integer, from_string);

        json["sub"] = serde_json::json!("alice");
        assert!(serde_json::from_value::<TokenClaims>(json.clone()).is_err());

        json["sub"] = serde_json::json!(true);
        assert!(serde_json::from_value::<TokenClaims>(json).is_err());
    }
}
