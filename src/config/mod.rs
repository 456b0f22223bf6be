/// Configuration management for the Schemaway server
///
/// Handles server binding, database location and identity mode.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Identity configuration (guest mode)
    pub auth: AuthConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Directory holding the SQLite database file (default: "data")
    /// Creates: {data_dir}/schemaway.db
    pub data_dir: String,
}

/// Identity configuration
///
/// Authentication is performed by the fronting proxy, which forwards the
/// authenticated user in the `x-user-id` header. Guest mode skips that and
/// serves every request as one synthetic user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Serve all requests as `guest_user_id`
    pub guest_mode: bool,
    /// Synthetic user id used in guest mode
    pub guest_user_id: String,
}

impl Config {
    /// Configuration rooted at a specific data directory, everything else default
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.database.data_dir = data_dir.into().to_string_lossy().into_owned();
        config
    }

    /// Address the HTTP listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for k8s/container deployment
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("SCHEMAWAY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("SCHEMAWAY_PORT")
                    .unwrap_or_else(|_| "3004".to_string())
                    .parse()
                    .unwrap_or(3004),
            },
            database: DatabaseConfig {
                data_dir: std::env::var("SCHEMAWAY_DATA_DIR")
                    .unwrap_or_else(|_| "data".to_string()),
            },
            auth: AuthConfig {
                guest_mode: std::env::var("SCHEMAWAY_GUEST_MODE")
                    .map(|value| parse_flag(&value))
                    .unwrap_or(false),
                guest_user_id: std::env::var("SCHEMAWAY_GUEST_USER_ID")
                    .ok()
                    .filter(|value| !value.trim().is_empty())
                    .unwrap_or_else(|| "guest".to_string()),
            },
        }
    }
}

/// Truthy env flag: 1/true/yes/on, case-insensitive
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
