//! Process configuration, read from the environment.

use chrono::Duration;
use thiserror::Error;

use roombook_auth::FreezePolicy;
use roombook_observability::LogFormat;

const DEFAULT_TOKEN_TTL_SECS: i64 = 86_400;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HS256 shared secret for signing and verifying bearer tokens.
    pub jwt_secret: String,
    /// Lifetime of tokens issued at login.
    pub token_ttl: Duration,
    /// Allowed clock skew when checking `iat`/`exp`.
    pub token_leeway: Duration,
    pub bind_addr: String,
    /// Postgres connection string; `None` selects the seeded in-memory store.
    pub database_url: Option<String>,
    pub freeze_policy: FreezePolicy,
    pub log_format: LogFormat,
}

impl ApiConfig {
    /// Defaults for everything but the signing secret.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            token_leeway: Duration::zero(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database_url: None,
            freeze_policy: FreezePolicy::default(),
            log_format: LogFormat::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let mut config = Self::with_secret(secret);

        if let Some(raw) = get("JWT_EXPIRES_IN_SECS") {
            config.token_ttl = Duration::seconds(parse_secs("JWT_EXPIRES_IN_SECS", &raw, 1)?);
        }
        if let Some(raw) = get("JWT_LEEWAY_SECS") {
            config.token_leeway = Duration::seconds(parse_secs("JWT_LEEWAY_SECS", &raw, 0)?);
        }
        if let Some(addr) = get("BIND_ADDR") {
            config.bind_addr = addr;
        }
        config.database_url = get("DATABASE_URL");
        if let Some(raw) = get("FREEZE_POLICY") {
            config.freeze_policy = raw.parse().map_err(|message| ConfigError::Invalid {
                key: "FREEZE_POLICY",
                message,
            })?;
        }
        if let Some(raw) = get("LOG_FORMAT") {
            config.log_format = raw.parse().map_err(|message| ConfigError::Invalid {
                key: "LOG_FORMAT",
                message,
            })?;
        }

        Ok(config)
    }
}

fn parse_secs(key: &'static str, raw: &str, min: i64) -> Result<i64, ConfigError> {
    let secs = raw.trim().parse::<i64>().map_err(|e| ConfigError::Invalid {
        key,
        message: e.to_string(),
    })?;
    if secs < min {
        return Err(ConfigError::Invalid {
            key,
            message: format!("must be at least {min}"),
        });
    }
    Ok(secs)
}
