//! Key/value application settings with typed values.
//!
//! Values are stored as text next to a `type` tag and resolved into a
//! [`SettingValue`] when read.

pub mod defaults;
pub mod store;
pub mod types;

pub use {
    defaults::{DEFAULT_SETTINGS, SeedDefaults, register_seed_defaults},
    store::SettingsStore,
    types::{Setting, SettingError, SettingKind, SettingValue},
};
