//! Application settings and configuration structures.

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// HTTP request handling limits
    pub http: HttpSettings,

    /// Redis configuration (optional, enables cross-node socket broadcasts)
    pub redis: RedisSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// Real-time socket configuration
    pub socket: SocketSettings,

    /// Log output configuration
    pub log: LogSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// HTTP request limits.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    /// Maximum accepted request body in bytes (default: 100KB)
    pub max_body_bytes: usize,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    /// Redis connection URL. Unset means single-node mode.
    pub url: Option<String>,

    /// Prefix for the pub/sub channels used by the socket adapter
    pub channel_prefix: String,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// Socket configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SocketSettings {
    /// Maximum message size in bytes (default: 64KB)
    pub max_message_size: usize,

    /// Maximum frame size in bytes (default: 16KB)
    pub max_frame_size: usize,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    pub format: LogFormat,
}

/// URL schemes accepted by the Redis client
const REDIS_SCHEMES: [&str; 3] = ["redis://", "rediss://", "unix://"];

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. Built-in defaults
    /// 2. config/default.toml (base configuration)
    /// 3. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 4. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if a value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        let builder = Self::with_defaults(&environment)?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Load from environment variables
            // APP__SERVER__PORT=3000 -> server.port = 3000
            .add_source(app_environment())
            // Map simple environment variables
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option(
                "server.port",
                std::env::var("PORT")
                    .or_else(|_| std::env::var("SERVER_PORT"))
                    .ok(),
            )?
            .set_override_option("redis.url", std::env::var("REDIS_URL").ok())?
            .set_override_option(
                "cors.allowed_origins",
                std::env::var("CLIENT_URL").ok().map(|url| vec![url]),
            )?;

        Self::finish(builder)
    }

    /// Build settings from an inline TOML document layered over the defaults.
    ///
    /// Used by tests and tooling that must not read the process environment.
    pub fn from_toml(document: &str) -> Result<Self, ConfigError> {
        let builder = Self::with_defaults("test")?
            .add_source(File::from_str(document, FileFormat::Toml));
        Self::finish(builder)
    }

    fn with_defaults(environment: &str) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("environment", environment)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("http.max_body_bytes", 102400_i64)? // 100KB
            .set_default("redis.channel_prefix", "socket.io")?
            .set_default("cors.allowed_origins", vec!["http://localhost:3000"])?
            .set_default("socket.max_message_size", 65536_i64)? // 64KB
            .set_default("socket.max_frame_size", 16384_i64)? // 16KB
            .set_default("log.format", "pretty")
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| settings.validate().map(|()| settings))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.http.max_body_bytes == 0 {
            return Err(ConfigError::Message(
                "http.max_body_bytes must be greater than zero".into(),
            ));
        }

        if let Some(url) = self.redis.url.as_deref() {
            if !REDIS_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
                return Err(ConfigError::Message(format!(
                    "redis.url must start with one of {:?}, got {}",
                    REDIS_SCHEMES, url
                )));
            }
        }

        Ok(())
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Whether the process runs with production settings.
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

/// `APP__` prefixed variables, with list-valued keys split on commas.
fn app_environment() -> Environment {
    Environment::default()
        .prefix("APP")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("cors.allowed_origins")
}

impl ServerSettings {
    /// Get the socket address for binding.
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Message(format!("Invalid server address: {}", e)))
    }
}
