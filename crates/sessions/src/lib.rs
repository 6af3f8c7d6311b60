//! Database-backed HTTP sessions.
//!
//! Session state lives in the `sessions` table as a JSON blob keyed by an
//! opaque id carried in a cookie. Rows are written lazily on save, never on
//! open. Expired rows are purged once per process start by the
//! [`sweep::ExpirySweep`] hook; between restarts they simply accumulate and are
//! ignored on open.

pub mod handle;
pub mod interface;
pub mod record;
pub mod store;
pub mod store_sqlite;
pub mod sweep;

pub use {
    handle::DbSession,
    interface::{DEFAULT_IDLE_TIMEOUT, SessionCookie, SessionInterface},
    record::SessionRecord,
    store::SessionStore,
    store_sqlite::SqliteSessionStore,
    sweep::{ExpirySweep, clear_expired, register_expiry_sweep},
};
