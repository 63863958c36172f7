//! Server configuration module
//!
//! Provides the configuration types for the grid server. Values are filled
//! in from the environment by `backend::server::config::load_config`, or
//! built directly in tests through [`ServerConfig::builder`].

use thiserror::Error;

use crate::shared::grid::GridGeometry;

/// Default WebSocket/HTTP port
pub const DEFAULT_PORT: u16 = 8888;
/// Default store key holding the packed grid
pub const DEFAULT_GRID_KEY: &str = "grid";
/// Default pub/sub topic carrying updates
pub const DEFAULT_CHANNEL: &str = "grid_updates";
/// Default directory for the client bundle
pub const DEFAULT_STATIC_DIR: &str = "emojiclient/dist";
/// Default sustained per-session rate (updates per second)
pub const DEFAULT_RATE_PER_SEC: f64 = 5.0;
/// Default per-session burst capacity
pub const DEFAULT_BURST: u32 = 10;
/// Slowest accepted refill rate, one token every 1000 seconds
pub const MIN_RATE_PER_SEC: f64 = 0.001;

/// Server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Listen port
    pub port: u16,
    /// Redis connection URL; `None` runs on the in-memory backend
    pub redis_url: Option<String>,
    /// Store key holding the packed grid
    pub grid_key: String,
    /// Pub/sub topic for updates
    pub channel: String,
    /// Directory served as the static fallback
    pub static_dir: String,
    /// Sustained per-session rate in updates per second
    pub rate_per_sec: f64,
    /// Per-session burst capacity
    pub burst: u32,
    /// Maximum concurrent sessions; `None` means unlimited
    pub max_sessions: Option<usize>,
    /// Grid shape
    pub geometry: GridGeometry,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            redis_url: None,
            grid_key: DEFAULT_GRID_KEY.to_string(),
            channel: DEFAULT_CHANNEL.to_string(),
            static_dir: DEFAULT_STATIC_DIR.to_string(),
            rate_per_sec: DEFAULT_RATE_PER_SEC,
            burst: DEFAULT_BURST,
            max_sessions: None,
            geometry: GridGeometry::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfigBuilder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.redis_url {
            if !(url.starts_with("redis://") || url.starts_with("rediss://")) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        if self.grid_key.is_empty() {
            return Err(ConfigError::MissingValue("grid key"));
        }
        if self.channel.is_empty() {
            return Err(ConfigError::MissingValue("channel"));
        }
        if !(self.rate_per_sec.is_finite() && self.rate_per_sec >= MIN_RATE_PER_SEC) {
            return Err(ConfigError::invalid("rate_per_sec", self.rate_per_sec));
        }
        if self.burst == 0 {
            return Err(ConfigError::invalid("burst", self.burst));
        }
        if self.max_sessions == Some(0) {
            return Err(ConfigError::invalid("max_sessions", 0));
        }
        let geometry = self.geometry;
        if geometry.size == 0 {
            return Err(ConfigError::invalid("grid size", geometry.size));
        }
        if geometry.bits_per_cell == 0 || geometry.bits_per_cell > 64 {
            return Err(ConfigError::invalid("bits per cell", geometry.bits_per_cell));
        }
        if geometry.bits_per_cell < 64 && geometry.max_value >> geometry.bits_per_cell != 0 {
            return Err(ConfigError::invalid("max cell value", geometry.max_value));
        }
        Ok(())
    }
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Use Redis at `url` instead of the in-memory backend
    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.config.redis_url = Some(url.into());
        self
    }

    pub fn grid_key(mut self, key: impl Into<String>) -> Self {
        self.config.grid_key = key.into();
        self
    }

    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.config.channel = channel.into();
        self
    }

    pub fn static_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.static_dir = dir.into();
        self
    }

    /// Set the per-session token bucket
    pub fn rate_limit(mut self, rate_per_sec: f64, burst: u32) -> Self {
        self.config.rate_per_sec = rate_per_sec;
        self.config.burst = burst;
        self
    }

    pub fn max_sessions(mut self, max: usize) -> Self {
        self.config.max_sessions = Some(max);
        self
    }

    pub fn geometry(mut self, geometry: GridGeometry) -> Self {
        self.config.geometry = geometry;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

impl ConfigError {
    pub fn invalid(key: &'static str, value: impl ToString) -> Self {
        Self::InvalidValue {
            key,
            value: value.to_string(),
        }
    }
}
