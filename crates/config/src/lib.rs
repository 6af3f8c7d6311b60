//! Configuration schema and discovery for webgui.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{config_dir, discover_and_load, load_config},
    schema::{DatabaseConfig, ServerConfig, SessionConfig, WebguiConfig},
};
