use std::sync::Arc;

use {
    async_trait::async_trait,
    tracing::info,
    webgui_common::{HookRegistry, LifecycleEvent, LifecycleHook},
};

use crate::{
    store::{INSERT_SETTING, SettingsStore},
    types::SettingKind,
};

/// Settings written into an empty table on first start.
pub const DEFAULT_SETTINGS: &[(&str, &str, SettingKind)] = &[
    ("alipay_enabled", "0", SettingKind::Boolean),
    ("wechatpay_enabled", "0", SettingKind::Boolean),
    ("signup_enabled", "1", SettingKind::Boolean),
    ("signup_without_invitation", "8", SettingKind::Number),
    ("signup_email_limit", "2", SettingKind::Number),
    ("shadowsock_port_range_start", "45000", SettingKind::Number),
];

impl SettingsStore {
    /// Insert [`DEFAULT_SETTINGS`] when the table is empty. Returns how many
    /// rows were written. The emptiness check and the inserts share one
    /// transaction, so a failed seed leaves the table empty.
    pub async fn seed_defaults(&self) -> anyhow::Result<usize> {
        let mut tx = self.pool.begin().await?;
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM webguiSetting")
            .fetch_one(&mut *tx)
            .await?;
        if existing != 0 {
            return Ok(0);
        }
        for (key, value, kind) in DEFAULT_SETTINGS {
            sqlx::query(INSERT_SETTING)
                .bind(*key)
                .bind(*value)
                .bind(kind.as_str())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        info!(count = DEFAULT_SETTINGS.len(), "seeded default settings");
        Ok(DEFAULT_SETTINGS.len())
    }
}

/// Lifecycle hook seeding defaults once the database exists.
pub struct SeedDefaults {
    store: SettingsStore,
}

impl SeedDefaults {
    pub fn new(store: SettingsStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LifecycleHook for SeedDefaults {
    fn name(&self) -> &str {
        "settings.seed_defaults"
    }

    async fn on_event(&self, _event: LifecycleEvent) -> anyhow::Result<()> {
        self.store.seed_defaults().await.map(|_| ())
    }
}

pub fn register_seed_defaults(hooks: &mut HookRegistry, store: SettingsStore) {
    hooks.on(
        LifecycleEvent::AfterCreateDb,
        Arc::new(SeedDefaults::new(store)),
    );
}
