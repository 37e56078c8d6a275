//! Application configuration loaded via OrthoConfig.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::RetryPolicy;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_JWT_TTL_MINUTES: i64 = 15;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_TX_MAX_RETRIES: u32 = 3;

/// Application settings (environment prefix `MERCH_`).
///
/// Only the database URL and the JWT secret are required; everything else
/// falls back to the defaults exposed by the accessors.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MERCH")]
pub struct AppConfig {
    /// Primary database URL.
    pub database_url: String,
    /// Optional read replica URL; falls back to the primary.
    pub replica_database_url: Option<String>,
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// HS256 secret for signing bearer tokens.
    pub jwt_secret: String,
    /// Token lifetime in minutes.
    pub jwt_ttl_minutes: Option<i64>,
    /// Maximum connections per pool.
    pub pool_max_size: Option<u32>,
    /// Attempt bound for conflict retries.
    pub tx_max_retries: Option<u32>,
    /// Optional per-attempt transaction timeout in milliseconds.
    pub tx_attempt_timeout_ms: Option<u64>,
}

impl AppConfig {
    /// The bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// The replica URL, falling back to the primary.
    pub fn replica_database_url(&self) -> &str {
        self.replica_database_url
            .as_deref()
            .unwrap_or(&self.database_url)
    }

    /// Token lifetime, falling back to 15 minutes.
    pub fn jwt_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.jwt_ttl_minutes.unwrap_or(DEFAULT_JWT_TTL_MINUTES))
    }

    /// Pool size, falling back to 10 connections.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// The retry policy for transactional units of work.
    pub fn retry_policy(&self) -> RetryPolicy {
        let policy = RetryPolicy::new(self.tx_max_retries.unwrap_or(DEFAULT_TX_MAX_RETRIES));
        match self.tx_attempt_timeout_ms {
            Some(millis) => policy.with_attempt_timeout(Duration::from_millis(millis)),
            None => policy,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration parsing.

    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    fn load_from_empty_args() -> AppConfig {
        AppConfig::load_from_iter([OsString::from("backend")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_only_required_values_are_set() {
        let _guard = lock_env([
            (
                "MERCH_DATABASE_URL",
                Some("postgres://localhost/store".to_owned()),
            ),
            ("MERCH_REPLICA_DATABASE_URL", None::<String>),
            ("MERCH_BIND_ADDR", None),
            ("MERCH_JWT_SECRET", Some("secret".to_owned())),
            ("MERCH_JWT_TTL_MINUTES", None),
            ("MERCH_POOL_MAX_SIZE", None),
            ("MERCH_TX_MAX_RETRIES", None),
            ("MERCH_TX_ATTEMPT_TIMEOUT_MS", None),
        ]);

        let config = load_from_empty_args();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.replica_database_url(), "postgres://localhost/store");
        assert_eq!(config.jwt_ttl(), chrono::Duration::minutes(15));
        assert_eq!(config.pool_max_size(), 10);
        assert_eq!(config.retry_policy(), RetryPolicy::new(3));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "MERCH_DATABASE_URL",
                Some("postgres://primary/store".to_owned()),
            ),
            (
                "MERCH_REPLICA_DATABASE_URL",
                Some("postgres://replica/store".to_owned()),
            ),
            ("MERCH_BIND_ADDR", Some("127.0.0.1:9090".to_owned())),
            ("MERCH_JWT_SECRET", Some("secret".to_owned())),
            ("MERCH_JWT_TTL_MINUTES", Some("60".to_owned())),
            ("MERCH_POOL_MAX_SIZE", Some("4".to_owned())),
            ("MERCH_TX_MAX_RETRIES", Some("5".to_owned())),
            ("MERCH_TX_ATTEMPT_TIMEOUT_MS", Some("250".to_owned())),
        ]);

        let config = load_from_empty_args();
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.replica_database_url(), "postgres://replica/store");
        assert_eq!(config.jwt_ttl(), chrono::Duration::minutes(60));
        assert_eq!(config.pool_max_size(), 4);
        assert_eq!(
            config.retry_policy(),
            RetryPolicy::new(5).with_attempt_timeout(Duration::from_millis(250))
        );
    }
}
