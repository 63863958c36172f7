/**
 * Server Configuration
 *
 * This module loads the server configuration from environment variables and
 * connects the grid backend it names.
 *
 * # Configuration Sources
 *
 * | Variable              | Default            |
 * |-----------------------|--------------------|
 * | `SERVER_PORT`         | `8888`             |
 * | `REDIS_URL`           | unset (in-memory)  |
 * | `GRID_KEY`            | `grid`             |
 * | `GRID_CHANNEL`        | `grid_updates`     |
 * | `STATIC_DIR`          | `emojiclient/dist` |
 * | `RATE_LIMIT_PER_SEC`  | `5`                |
 * | `RATE_LIMIT_BURST`    | `10`               |
 * | `MAX_SESSIONS`        | unset (unlimited)  |
 *
 * `main` loads `.env` first, so any of these can live there.
 *
 * # Error Handling
 *
 * A variable that is set but does not parse is a startup error. Without
 * `REDIS_URL` the server runs on the in-memory backend and says so; with it,
 * failing to connect is fatal.
 */

use std::str::FromStr;
use std::sync::Arc;

use crate::backend::store::{GridStore, MemoryBackend, RedisBackend, StoreError, UpdateChannel};
use crate::shared::{ConfigError, ServerConfig};

/// Grid store and update channel, usually the same backend behind two traits
#[derive(Clone)]
pub struct Backend {
    pub store: Arc<dyn GridStore>,
    pub channel: Arc<dyn UpdateChannel>,
}

impl Backend {
    /// Single-process backend; updates stay within this node
    pub fn memory() -> Self {
        let backend = MemoryBackend::new();
        Self {
            store: Arc::new(backend.clone()),
            channel: Arc::new(backend),
        }
    }

    /// Redis backend shared by every node pointed at the same server
    pub async fn redis(url: &str) -> Result<Self, StoreError> {
        let backend = RedisBackend::connect(url).await?;
        Ok(Self {
            store: Arc::new(backend.clone()),
            channel: Arc::new(backend),
        })
    }
}

/// Read an optional variable; empty counts as unset
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env_var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::invalid(key, raw)),
        None => Ok(None),
    }
}

/// Load the server configuration from the environment
///
/// # Errors
///
/// Returns `ConfigError` if a variable does not parse or the resulting
/// configuration fails validation.
pub fn load_config() -> Result<ServerConfig, ConfigError> {
    let defaults = ServerConfig::default();
    let mut builder = ServerConfig::builder();

    if let Some(port) = env_parse::<u16>("SERVER_PORT")? {
        builder = builder.port(port);
    }
    if let Some(url) = env_var("REDIS_URL") {
        builder = builder.redis_url(url);
    }
    if let Some(key) = env_var("GRID_KEY") {
        builder = builder.grid_key(key);
    }
    if let Some(channel) = env_var("GRID_CHANNEL") {
        builder = builder.channel(channel);
    }
    if let Some(dir) = env_var("STATIC_DIR") {
        builder = builder.static_dir(dir);
    }

    let rate = env_parse::<f64>("RATE_LIMIT_PER_SEC")?.unwrap_or(defaults.rate_per_sec);
    let burst = env_parse::<u32>("RATE_LIMIT_BURST")?.unwrap_or(defaults.burst);
    builder = builder.rate_limit(rate, burst);

    if let Some(max) = env_parse::<usize>("MAX_SESSIONS")? {
        builder = builder.max_sessions(max);
    }

    builder.build()
}

/// Connect the backend named by the configuration
///
/// # Errors
///
/// Returns `StoreError` if `REDIS_URL` is set and the server cannot be
/// reached.
pub async fn connect_backend(config: &ServerConfig) -> Result<Backend, StoreError> {
    match &config.redis_url {
        Some(url) => {
            tracing::info!("Connecting to Redis...");
            let backend = Backend::redis(url).await?;
            tracing::info!("Redis connection established");
            Ok(backend)
        }
        None => {
            tracing::warn!("REDIS_URL not set. Using in-memory grid; updates will not reach other nodes.");
            Ok(Backend::memory())
        }
    }
}
