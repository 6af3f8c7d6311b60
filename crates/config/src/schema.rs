//! Config schema types (server, database, session).

use serde::{Deserialize, Serialize};

/// Default lifetime of a permanent session: 31 days.
pub const DEFAULT_PERMANENT_LIFETIME_SECS: u64 = 31 * 24 * 60 * 60;

/// Root configuration, passed explicitly to every component at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebguiConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite connection URL (`sqlite::memory:` for tests).
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://webgui.db".into(),
        }
    }
}

/// Session cookie and lifetime settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session id.
    pub cookie_name: String,
    /// Cookie `Domain` attribute. Omitted from the cookie when unset.
    pub cookie_domain: Option<String>,
    /// Lifetime of sessions marked permanent, in seconds.
    pub permanent_lifetime_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "session".into(),
            cookie_domain: None,
            permanent_lifetime_secs: DEFAULT_PERMANENT_LIFETIME_SECS,
        }
    }
}
