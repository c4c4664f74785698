//! # Process configuration
//!
//! Layered with the `config` crate, later sources overriding earlier ones:
//!
//! 1. built-in defaults (below),
//! 2. an optional `notes.toml` in the working directory,
//! 3. environment variables prefixed `NOTES`, with `__` between path segments
//!    (`NOTES__AUTH__SECRET`, `NOTES__STORAGE__BACKEND`, ...).
//!
//! ```toml
//! [server]
//! listen = "127.0.0.1:8080"
//!
//! [auth]
//! secret = "..."            # required, at least 32 bytes
//! token_ttl_secs = 3600
//! hash_memory_kib = 19456
//! hash_iterations = 2
//! hash_parallelism = 1
//!
//! [storage]
//! backend = "sqlite"        # or "memory"
//! database_url = "sqlite://notes.db?mode=rwc"
//!
//! [log]
//! level = "info"
//! ```
//!
//! There is no default signing secret. [`Settings::validate`] refuses to start
//! without one.

use std::fmt;

use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use crate::auth::{Hasher, TokenIssuer};

/// Shortest accepted signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Deserialize)]
pub struct Server {
    pub listen: String,
}

#[derive(Deserialize)]
pub struct Auth {
    #[serde(default)]
    pub secret: Option<String>,
    pub token_ttl_secs: u64,
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
    pub hash_parallelism: u32,
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("hash_memory_kib", &self.hash_memory_kib)
            .field("hash_iterations", &self.hash_iterations)
            .field("hash_parallelism", &self.hash_parallelism)
            .finish()
    }
}

/// Which store implementation to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Memory,
    Sqlite,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
    pub backend: Backend,
    pub database_url: String,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub auth: Auth,
    pub storage: Storage,
    pub log: Log,
}

impl Settings {
    fn defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.listen", "127.0.0.1:8080")?
            .set_default("auth.token_ttl_secs", 3600_i64)?
            .set_default("auth.hash_memory_kib", i64::from(argon2::Params::DEFAULT_M_COST))?
            .set_default("auth.hash_iterations", i64::from(argon2::Params::DEFAULT_T_COST))?
            .set_default("auth.hash_parallelism", i64::from(argon2::Params::DEFAULT_P_COST))?
            .set_default("storage.backend", "memory")?
            .set_default("storage.database_url", "sqlite://notes.db?mode=rwc")?
            .set_default("log.level", "info")
    }

    /// Load from defaults, `notes.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::defaults()?
            .add_source(File::with_name("notes").format(FileFormat::Toml).required(false))
            // No try_parsing: an all-digit secret must keep its exact bytes.
            .add_source(Environment::with_prefix("NOTES").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Load from defaults overlaid with a TOML document.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Reject configurations the service must not start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.auth.secret.as_deref() {
            None | Some("") => {
                return Err(ConfigError::Message(
                    "auth.secret is required (set NOTES__AUTH__SECRET)".into(),
                ))
            }
            Some(secret) if secret.len() < MIN_SECRET_LEN => {
                return Err(ConfigError::Message(format!(
                    "auth.secret must be at least {MIN_SECRET_LEN} bytes"
                )))
            }
            Some(_) => {}
        }

        if self.auth.token_ttl_secs == 0 {
            return Err(ConfigError::Message(
                "auth.token_ttl_secs must be positive".into(),
            ));
        }

        self.hasher()?;
        Ok(())
    }

    /// Token issuer for the configured secret and lifetime.
    pub fn token_issuer(&self) -> Result<TokenIssuer, ConfigError> {
        let secret = self
            .auth
            .secret
            .as_deref()
            .ok_or_else(|| ConfigError::Message("auth.secret is required".into()))?;
        Ok(TokenIssuer::new(secret.as_bytes(), self.auth.token_ttl_secs))
    }

    /// Password hasher for the configured argon2 cost.
    pub fn hasher(&self) -> Result<Hasher, ConfigError> {
        Hasher::new(
            self.auth.hash_memory_kib,
            self.auth.hash_iterations,
            self.auth.hash_parallelism,
        )
        .map_err(|e| ConfigError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::{remove_var, set_var};

    const SECRET: &str = "a-sufficiently-long-secret-for-tests-0123";

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.server.listen, "127.0.0.1:8080");
        assert_eq!(settings.auth.token_ttl_secs, 3600);
        assert_eq!(settings.auth.hash_memory_kib, 19456);
        assert_eq!(settings.storage.backend, Backend::Memory);
        assert_eq!(settings.log.level, "info");
        assert!(settings.auth.secret.is_none());
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let settings = Settings::from_toml("").unwrap();
        assert!(settings.validate().is_err());
        assert!(settings.token_issuer().is_err());
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let settings = Settings::from_toml("[auth]\nsecret = \"short\"").unwrap();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("32"));
    }

    #[test]
    fn test_overrides() {
        let toml = format!(
            r#"
            [auth]
            secret = "{SECRET}"
            token_ttl_secs = 60

            [storage]
            backend = "sqlite"
            database_url = "sqlite::memory:"
            "#
        );
        let settings = Settings::from_toml(&toml).unwrap();
        settings.validate().unwrap();
        assert_eq!(settings.auth.token_ttl_secs, 60);
        assert_eq!(settings.storage.backend, Backend::Sqlite);
        assert_eq!(settings.token_issuer().unwrap().ttl_secs(), 60);
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        let toml = format!("[auth]\nsecret = \"{SECRET}\"\ntoken_ttl_secs = 0");
        assert!(Settings::from_toml(&toml).unwrap().validate().is_err());
    }

    #[test]
    fn test_bad_hash_cost_is_rejected() {
        let toml = format!("[auth]\nsecret = \"{SECRET}\"\nhash_memory_kib = 1");
        assert!(Settings::from_toml(&toml).unwrap().validate().is_err());
    }

    #[test]
    fn test_environment_overrides() {
        let digits = "123456789012345678901234567890123456";
        set_var("NOTES__AUTH__SECRET", digits);
        set_var("NOTES__AUTH__TOKEN_TTL_SECS", "77");
        set_var("NOTES__STORAGE__BACKEND", "sqlite");

        let loaded = Settings::load();

        remove_var("NOTES__AUTH__SECRET");
        remove_var("NOTES__AUTH__TOKEN_TTL_SECS");
        remove_var("NOTES__STORAGE__BACKEND");

        let settings = loaded.unwrap();
        assert_eq!(settings.auth.secret.as_deref(), Some(digits));
        assert_eq!(settings.auth.token_ttl_secs, 77);
        assert_eq!(settings.storage.backend, Backend::Sqlite);
        assert_eq!(settings.server.listen, "127.0.0.1:8080");
        settings.validate().unwrap();
    }

    #[test]
    fn test_debug_redacts_secret() {
        let toml = format!("[auth]\nsecret = \"{SECRET}\"");
        let settings = Settings::from_toml(&toml).unwrap();
        assert!(!format!("{:?}", settings).contains(SECRET));
    }
}
