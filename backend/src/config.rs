//! Runtime configuration, read once from the environment at startup.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `HOST` | `127.0.0.1` | Bind address |
//! | `PORT` | `5000` | Bind port |
//! | `DATABASE_URL` | `sqlite:///aidoshop.db` | SQLite file (or `:memory:`) |
//! | `SECRET_KEY` | `change-me-in-env` | Key signing the admin session cookie |
//! | `ADMIN_USERNAME` | `aido` | Admin login |
//! | `ADMIN_PASSWORD` | `aido123!` | Admin password |
//! | `SESSION_TTL_HOURS` | `12` | Lifetime of an admin session |
//!
//! The defaults are only meant for local development.

use chrono::Duration;
use log::warn;
use std::env;

const DEFAULT_DATABASE_URL: &str = "sqlite:///aidoshop.db";
const DEFAULT_SECRET_KEY: &str = "change-me-in-env";
const DEFAULT_ADMIN_USERNAME: &str = "aido";
const DEFAULT_ADMIN_PASSWORD: &str = "aido123!";
const DEFAULT_SESSION_TTL_HOURS: i64 = 12;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub secret_key: String,
    pub admin_username: String,
    pub admin_password: String,
    pub session_ttl_hours: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            admin_username: DEFAULT_ADMIN_USERNAME.to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }
}

impl AppConfig {
    /// Builds the configuration from environment variables, falling back to
    /// the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            secret_key: env::var("SECRET_KEY").unwrap_or(defaults.secret_key),
            admin_username: env::var("ADMIN_USERNAME").unwrap_or(defaults.admin_username),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or(defaults.admin_password),
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|h| parse_ttl_hours(&h))
                .unwrap_or(defaults.session_ttl_hours),
        };

        if config.secret_key == DEFAULT_SECRET_KEY {
            warn!("SECRET_KEY is not set; admin sessions are signed with the default key");
        }
        if config.admin_password == DEFAULT_ADMIN_PASSWORD {
            warn!("ADMIN_PASSWORD is not set; using the default admin password");
        }

        config
    }

    /// Filesystem path of the SQLite database, with any `sqlite://` scheme
    /// removed. `:memory:` is returned unchanged.
    pub fn database_path(&self) -> &str {
        let url = self.database_url.trim();
        url.strip_prefix("sqlite:///")
            .or_else(|| url.strip_prefix("sqlite://"))
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url)
    }

    /// Lifetime of an admin session. An out-of-range hour count falls back
    /// to the default.
    pub fn session_ttl(&self) -> Duration {
        Duration::try_hours(self.session_ttl_hours)
            .filter(|ttl| *ttl > Duration::zero())
            .unwrap_or_else(|| Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

/// A positive hour count that chrono can represent.
fn parse_ttl_hours(raw: &str) -> Option<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|h| *h > 0 && Duration::try_hours(*h).is_some())
}
