//! Configuration Module
//!
//! Centralized configuration for the server, the store, and the identity
//! provider, read from environment variables.

/// Environment variable helpers
pub mod env {
    use std::env;

    /// Get environment variable as string with default
    pub fn get_string(key: &str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get environment variable as an optional, non-empty string
    pub fn get_optional(key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.trim().is_empty())
    }

    /// Get environment variable as u32 with default
    pub fn get_u32(key: &str, default: u32) -> u32 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as u16 with default
    pub fn get_u16(key: &str, default: u16) -> u16 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as u64 with default
    pub fn get_u64(key: &str, default: u64) -> u64 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}

/// Application configuration combining all service configurations
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseSettings,

    /// Identity provider configuration
    pub identity: IdentityConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
    pub max_lifetime_seconds: u64,
}

/// Identity provider configuration
///
/// One of `jwt_secret` (HS256) or `public_key_path` (RS256 PEM) must be set;
/// the public key wins when both are present.
#[derive(Debug, Clone, Default)]
pub struct IdentityConfig {
    pub jwt_secret: Option<String>,
    pub public_key_path: Option<String>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    /// Endpoint receiving display-name updates
    pub profile_sync_url: Option<String>,
    pub admin_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: env::get_string("SERVER_HOST", "0.0.0.0"),
            port: env::get_u16("SERVER_PORT", 5000),
            log_level: env::get_string("LOG_LEVEL", "info"),
            cors_origins: env::get_string("CORS_ORIGINS", "*")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: env::get_string("DATABASE_URL", "sqlite://internhub.db"),
            max_connections: env::get_u32("DB_MAX_CONNECTIONS", 5),
            min_connections: env::get_u32("DB_MIN_CONNECTIONS", 1),
            connect_timeout_seconds: env::get_u64("DB_CONNECT_TIMEOUT", 30),
            idle_timeout_seconds: env::get_u64("DB_IDLE_TIMEOUT", 600),
            max_lifetime_seconds: env::get_u64("DB_MAX_LIFETIME", 3600),
        }
    }
}

impl IdentityConfig {
    pub fn from_env() -> Self {
        Self {
            jwt_secret: env::get_optional("IDENTITY_JWT_SECRET"),
            public_key_path: env::get_optional("IDENTITY_JWT_PUBLIC_KEY_PATH"),
            issuer: env::get_optional("IDENTITY_ISSUER"),
            audience: env::get_optional("IDENTITY_AUDIENCE"),
            profile_sync_url: env::get_optional("IDENTITY_PROFILE_SYNC_URL"),
            admin_token: env::get_optional("IDENTITY_ADMIN_TOKEN"),
        }
    }
}

impl AppConfig {
    /// Load complete application configuration from environment
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseSettings::default(),
            identity: IdentityConfig::from_env(),
        }
    }

    /// Validate the complete configuration
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".into());
        }

        if self.database.url.is_empty() {
            return Err("DATABASE_URL cannot be empty".into());
        }

        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".into());
        }

        if self.database.min_connections > self.database.max_connections {
            return Err("Database min_connections cannot be greater than max_connections".into());
        }

        if self.identity.jwt_secret.is_none() && self.identity.public_key_path.is_none() {
            return Err(
                "Either IDENTITY_JWT_SECRET or IDENTITY_JWT_PUBLIC_KEY_PATH must be set".into(),
            );
        }

        if self.identity.admin_token.is_some() && self.identity.profile_sync_url.is_none() {
            log::warn!("IDENTITY_ADMIN_TOKEN is set but IDENTITY_PROFILE_SYNC_URL is not");
        }

        Ok(())
    }

    /// Whether display-name changes are pushed to the identity provider
    pub fn profile_sync_enabled(&self) -> bool {
        self.identity.profile_sync_url.is_some()
    }
}
