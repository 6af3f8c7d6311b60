//! Shared plumbing used across webgui crates.

pub mod hooks;

pub use hooks::{HookRegistry, LifecycleEvent, LifecycleHook};
