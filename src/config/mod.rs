//! Configuration management

use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Application environment: "development", "test" or "production"
    pub environment: String,
    /// Whether to expose interactive API docs (Swagger UI). Should be false in hardened production.
    pub enable_docs: bool,
    /// Global request timeout in seconds applied at the HTTP layer.
    pub request_timeout_seconds: u64,
    /// Allowed CORS origins. Use ["*"] to allow any (development only).
    pub allowed_origins: Vec<String>,
    /// Security configuration
    pub security: SecurityConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: "development".to_string(),
            enable_docs: true,
            request_timeout_seconds: 30,
            allowed_origins: vec!["*".to_string()],
            security: SecurityConfig::default(),
        }
    }
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Whether to add security headers to every response
    pub enable_security_headers: bool,
    /// HSTS max age in seconds (31536000 = 1 year)
    pub hsts_max_age: u64,
    /// Whether to include subdomains in HSTS
    pub hsts_include_subdomains: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_security_headers: true,
            hsts_max_age: 31_536_000,
            hsts_include_subdomains: true,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite connection string, e.g. "sqlite://data/app.db" or "sqlite::memory:"
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/app.db?mode=rwc".to_string(),
            max_connections: 25,
            connect_timeout_seconds: 10,
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Secret key used to sign JWTs. Must be overridden outside development.
    pub jwt_secret: String,
    /// Access token TTL in minutes
    pub token_ttl_minutes: u64,
    /// Refresh token TTL in minutes
    pub refresh_token_ttl_minutes: u64,
    /// JWT issuer claim
    pub issuer: String,
    /// Bcrypt cost factor. Lower it in tests to keep them fast.
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            token_ttl_minutes: 60,
            refresh_token_ttl_minutes: 24 * 60,
            issuer: "keel-api".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Rate limiting configuration
///
/// Two independent per-IP policies: a relaxed one for general API traffic
/// and a stricter one for authentication endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enabled
    pub enabled: bool,
    /// General policy: requests allowed per second per IP
    pub requests_per_second: f64,
    /// General policy: burst capacity per IP
    pub burst: u32,
    /// Auth policy: requests allowed per minute per IP
    pub auth_requests_per_minute: f64,
    /// Auth policy: burst capacity per IP
    pub auth_burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: 10.0,
            burst: 20,
            auth_requests_per_minute: 5.0,
            auth_burst: 5,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        // Add environment-specific config if ENV is set
        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        // Add local config and environment variables last (highest priority)
        builder = builder
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("KEEL").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the loaded configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "database.url must be set".to_string(),
            ));
        }
        if self.auth.jwt_secret.len() < 16 {
            return Err(ConfigLoadError::Validation(
                "auth.jwt_secret must be at least 16 characters".to_string(),
            ));
        }
        // Refuse to start in production with the default secret
        if self.is_production() && self.auth.jwt_secret == AuthConfig::default().jwt_secret {
            return Err(ConfigLoadError::Validation(
                "auth.jwt_secret must not use the default value in production".to_string(),
            ));
        }
        if self.rate_limit.enabled {
            if self.rate_limit.requests_per_second <= 0.0 || self.rate_limit.burst == 0 {
                return Err(ConfigLoadError::Validation(
                    "rate_limit general policy must have a positive rate and burst".to_string(),
                ));
            }
            if self.rate_limit.auth_requests_per_minute <= 0.0 || self.rate_limit.auth_burst == 0 {
                return Err(ConfigLoadError::Validation(
                    "rate_limit auth policy must have a positive rate and burst".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// True if the application is running in production mode
    pub fn is_production(&self) -> bool {
        self.server.environment == "production"
    }

    /// True if the application is running in development mode
    pub fn is_development(&self) -> bool {
        self.server.environment == "development"
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
