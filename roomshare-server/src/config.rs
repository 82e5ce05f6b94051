//! Server configuration

use std::str::FromStr;

use serde::Deserialize;

/// Default bcrypt cost factor
pub const DEFAULT_BCRYPT_COST: u32 = 12;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// SQLite database file; `None` keeps everything in memory
    pub database_path: Option<String>,

    /// How long an emailed verification code stays valid
    pub verification_ttl_minutes: i64,

    /// bcrypt cost used when hashing new passwords
    pub bcrypt_cost: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            database_path: None,
            verification_ttl_minutes: 10,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

impl Config {
    /// Load configuration from `ROOMSHARE_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_or("ROOMSHARE_PORT", defaults.port),
            database_path: std::env::var("ROOMSHARE_DATABASE")
                .ok()
                .filter(|p| !p.trim().is_empty()),
            verification_ttl_minutes: env_or(
                "ROOMSHARE_VERIFICATION_TTL_MINUTES",
                defaults.verification_ttl_minutes,
            ),
            bcrypt_cost: env_or("ROOMSHARE_BCRYPT_COST", defaults.bcrypt_cost),
        }
    }
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_or(key, &raw, default),
        Err(_) => default,
    }
}

fn parse_or<T>(key: &str, raw: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(key, value = raw, default = %default, "Ignoring invalid setting");
            default
        }
    }
}
