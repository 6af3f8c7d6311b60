//! Gateway: HTTP server, database sessions, role-gated API.
//!
//! Lifecycle:
//! 1. Connect the SQLite pool and create tables
//! 2. Register lifecycle hooks (expiry sweep, default settings)
//! 3. Fire `AfterCreateDb`
//! 4. Build the router: session middleware around `/health` and `/api`
//! 5. Serve
//!
//! Handlers never touch the session table directly; they see a [`Session`]
//! opened by the middleware and saved after they return.

pub mod admin_api;
pub mod db;
pub mod error;
pub mod guard;
pub mod routes;
pub mod server;
pub mod session_layer;
pub mod state;
pub mod user_api;

pub use {
    error::ApiError,
    guard::Role,
    routes::{ApiRoutes, PageArgs},
    server::{build_app, prepare, start},
    session_layer::Session,
    state::AppState,
};
