//! Database configuration.
//!
//! Settings come from the environment (optionally seeded from a `.env` file)
//! or from a TOML document:
//!
//! ```toml
//! database_url = "postgres://${PGUSER}@localhost/jobly"
//! max_pool_size = 8
//! ```

use crate::error::{DbError, DbResult};
use serde::Deserialize;

/// Connection string used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "postgresql:///jobly";

/// Pool size used when none is configured.
pub const DEFAULT_MAX_POOL_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DbConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: usize,
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

fn default_max_pool_size() -> usize {
    DEFAULT_MAX_POOL_SIZE
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            max_pool_size: default_max_pool_size(),
        }
    }
}

impl DbConfig {
    /// Read `DATABASE_URL` and `DATABASE_POOL_SIZE`, loading `.env` first if present.
    pub fn from_env() -> DbResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DbResult<Self> {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(default_database_url);
        let max_pool_size = match lookup("DATABASE_POOL_SIZE") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                DbError::Config(format!("DATABASE_POOL_SIZE must be a number, got '{raw}'"))
            })?,
            None => default_max_pool_size(),
        };
        Self {
            database_url,
            max_pool_size,
        }
        .validated()
    }

    /// Parse a TOML document. `${VAR}` in `database_url` is expanded from the environment.
    pub fn from_toml_str(raw: &str) -> DbResult<Self> {
        let mut config: DbConfig = toml::from_str(raw)
            .map_err(|e| DbError::Config(format!("failed to parse config: {e}")))?;
        config.database_url = expand_env(&config.database_url, |key| std::env::var(key).ok())?;
        config.validated()
    }

    fn validated(self) -> DbResult<Self> {
        if self.database_url.trim().is_empty() {
            return Err(DbError::Config("database_url cannot be empty".to_string()));
        }
        if self.max_pool_size == 0 {
            return Err(DbError::Config("max_pool_size must be at least 1".to_string()));
        }
        Ok(self)
    }

    /// Build a connection pool from this configuration.
    #[cfg(feature = "pool")]
    pub fn create_pool(&self) -> DbResult<deadpool_postgres::Pool> {
        crate::pool::create_pool_with_config(&self.database_url, self.max_pool_size)
    }
}

fn expand_env(input: &str, lookup: impl Fn(&str) -> Option<String>) -> DbResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            return Err(DbError::Config(format!("unterminated '${{' in '{input}'")));
        };
        let key = &after[..end];
        let value = lookup(key)
            .ok_or_else(|| DbError::Config(format!("environment variable {key} is not set")))?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = DbConfig::from_lookup(env(&[])).unwrap();
        assert_eq!(config, DbConfig::default());
        assert_eq!(config.database_url, "postgresql:///jobly");
    }

    #[test]
    fn reads_url_and_pool_size() {
        let config = DbConfig::from_lookup(env(&[
            ("DATABASE_URL", "postgres://localhost/jobly_test"),
            ("DATABASE_POOL_SIZE", " 4 "),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "postgres://localhost/jobly_test");
        assert_eq!(config.max_pool_size, 4);
    }

    #[test]
    fn bad_pool_size_is_config_error() {
        let err = DbConfig::from_lookup(env(&[("DATABASE_POOL_SIZE", "many")])).unwrap_err();
        assert!(matches!(err, DbError::Config(_)));
        assert!(DbConfig::from_lookup(env(&[("DATABASE_POOL_SIZE", "0")])).is_err());
    }

    #[test]
    fn toml_uses_defaults_for_missing_keys() {
        let config = DbConfig::from_toml_str("max_pool_size = 2").unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.max_pool_size, 2);
    }

    #[test]
    fn toml_rejects_unknown_keys() {
        assert!(DbConfig::from_toml_str("pool = 2").is_err());
    }

    #[test]
    fn expands_placeholders() {
        let out = expand_env(
            "postgres://${USER}@${HOST}/jobly",
            env(&[("USER", "app"), ("HOST", "db")]),
        )
        .unwrap();
        assert_eq!(out, "postgres://app@db/jobly");
    }

    #[test]
    fn missing_variable_is_error() {
        assert!(expand_env("postgres://${NOPE}/x", env(&[])).is_err());
        assert!(expand_env("postgres://${OPEN", env(&[])).is_err());
    }
}
