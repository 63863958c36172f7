//! Server Module
//!
//! This module contains all server-side code for initializing and configuring
//! the Axum HTTP server.
//!
//! # Architecture
//!
//! - **`state`** - Application state structure and `FromRef` implementations
//! - **`config`** - Environment configuration and backend connection
//! - **`init`** - Server initialization and app creation
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - load_config, connect_backend
//! └── init.rs         - create_state, create_app
//! ```
//!
//! # State Management
//!
//! `AppState` holds the canvas, the connection registry, the update channel
//! and the per-session rate limit. It is cloned into every handler and
//! session; all shared parts sit behind `Arc`.
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: environment (and `.env`) into `ServerConfig`
//! 2. **Backend Connection**: Redis, or the in-memory backend
//! 3. **Grid Initialization**: zero-filled packed grid if the key is absent
//! 4. **Fanout Bridge**: standing subscription on the update topic
//! 5. **Router Creation**: WebSocket, health and static routes
//!
//! # Example
//!
//! ```rust,no_run
//! use gridcast::backend::server::{config::load_config, create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config()?;
//! let app = create_app(&config).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

// Re-export commonly used types
pub use config::{connect_backend, load_config, Backend};
pub use init::{create_app, create_state};
pub use state::AppState;
