//! One-shot purge of expired session rows.
//!
//! Runs once, on [`LifecycleEvent::AfterCreateDb`]. There is no recurring
//! timer, so rows that expire while the process is up stay in the table until
//! the next start (or a manual `webgui sessions sweep`).

use std::sync::Arc;

use {
    async_trait::async_trait,
    time::OffsetDateTime,
    tracing::info,
    webgui_common::{HookRegistry, LifecycleEvent, LifecycleHook},
};

use crate::store::SessionStore;

/// Delete every row that expired before now.
pub async fn clear_expired(store: &dyn SessionStore) -> anyhow::Result<u64> {
    let removed = store.delete_expired(OffsetDateTime::now_utc()).await?;
    info!(removed, "expired sessions cleared");
    Ok(removed)
}

/// Lifecycle hook wrapping [`clear_expired`].
pub struct ExpirySweep {
    store: Arc<dyn SessionStore>,
}

impl ExpirySweep {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LifecycleHook for ExpirySweep {
    fn name(&self) -> &str {
        "sessions.expiry_sweep"
    }

    async fn on_event(&self, _event: LifecycleEvent) -> anyhow::Result<()> {
        clear_expired(self.store.as_ref()).await.map(|_| ())
    }
}

/// Subscribe the expiry sweep to `AfterCreateDb`.
pub fn register_expiry_sweep(hooks: &mut HookRegistry, store: Arc<dyn SessionStore>) {
    hooks.on(
        LifecycleEvent::AfterCreateDb,
        Arc::new(ExpirySweep::new(store)),
    );
}
