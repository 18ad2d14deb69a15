//! Configuration for the SNS gateway
//!
//! Loads settings from environment variables, with a `.env` file read first
//! for local development. The resulting value is handed to constructors;
//! nothing is stored globally.

use anyhow::{bail, Context, Result};
use crypto_core::JwtConfig;
use db_pool::DbConfig;
use feed_service::DEFAULT_PAGE_SIZE;
use identity_service::config::OAuthSettings;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Settings {
    /// HTTP listener and cookie policy
    pub server: ServerSettings,

    /// Session token signing
    pub jwt: JwtConfig,

    /// Third-party login providers
    pub oauth: OAuthSettings,

    /// SQLite pool
    pub database: DbConfig,

    /// Page sizes
    pub feed: FeedSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Mark session cookies `Secure`; enable behind TLS
    pub cookie_secure: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cookie_secure: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeedSettings {
    pub page_size: u32,
    pub suggested_users: u32,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            suggested_users: 5,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let defaults = ServerSettings::default();
        let server = ServerSettings {
            host: env::var("APP_HOST").unwrap_or(defaults.host),
            port: match env::var("APP_PORT") {
                Ok(raw) => raw.parse().context("APP_PORT must be a port number")?,
                Err(_) => defaults.port,
            },
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.cookie_secure),
        };

        let secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let oauth = OAuthSettings::from_env();
        if oauth.google().is_none() {
            warn!("Google OAuth not configured; /auth/google is disabled");
        }

        let database = DbConfig::from_env("sns-gateway").map_err(anyhow::Error::msg)?;

        let settings = Self {
            server,
            jwt: JwtConfig::new(secret),
            oauth,
            database,
            feed: FeedSettings::default(),
        };

        info!(
            host = %settings.server.host,
            port = settings.server.port,
            cookie_secure = settings.server.cookie_secure,
            "Configuration loaded"
        );
        Ok(settings)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_defaults() {
        let feed = FeedSettings::default();
        assert_eq!(feed.page_size, 20);
        assert_eq!(feed.suggested_users, 5);
    }

    #[test]
    fn test_server_defaults() {
        let server = ServerSettings::default();
        assert_eq!(server.port, 8080);
        assert!(!server.cookie_secure);
    }
}
