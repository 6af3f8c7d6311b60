use tracing::debug;

use crate::types::{Setting, SettingKind};

pub(crate) const INSERT_SETTING: &str =
    "INSERT OR IGNORE INTO webguiSetting (key, value, type) VALUES (?, ?, ?)";

/// SQLite-backed settings table (`webguiSetting`).
#[derive(Clone)]
pub struct SettingsStore {
    pub(crate) pool: sqlx::SqlitePool,
}

#[derive(sqlx::FromRow)]
struct SettingRow {
    id: i64,
    key: String,
    value: Option<String>,
    #[sqlx(rename = "type")]
    kind: Option<String>,
}

impl From<SettingRow> for Setting {
    fn from(r: SettingRow) -> Self {
        Self {
            id: r.id,
            key: r.key,
            value: r.value.unwrap_or_default(),
            kind: SettingKind::from_tag(r.kind.as_deref()),
        }
    }
}

impl SettingsStore {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the `webguiSetting` table if it doesn't exist.
    pub async fn init(pool: &sqlx::SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS webguiSetting (
                id    INTEGER PRIMARY KEY AUTOINCREMENT,
                key   TEXT UNIQUE NOT NULL,
                value TEXT,
                type  TEXT DEFAULT 'String'
            )"#,
        )
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn count(&self) -> anyhow::Result<u64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM webguiSetting")
            .fetch_one(&self.pool)
            .await?;
        Ok(n as u64)
    }

    pub async fn get(&self, key: &str) -> anyhow::Result<Option<Setting>> {
        let row = sqlx::query_as::<_, SettingRow>(
            "SELECT id, key, value, type FROM webguiSetting WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Fetch `key`, inserting `default` with `kind` first if it is missing.
    pub async fn get_or_insert(
        &self,
        key: &str,
        default: &str,
        kind: SettingKind,
    ) -> anyhow::Result<Setting> {
        if let Some(existing) = self.get(key).await? {
            return Ok(existing);
        }
        self.insert(key, default, kind).await?;
        debug!(key, kind = kind.as_str(), "inserted default setting");
        self.get(key)
            .await?
            .ok_or_else(|| anyhow::anyhow!("setting {key} vanished after insert"))
    }

    /// Insert a new setting; keys that already exist are left untouched.
    pub async fn insert(&self, key: &str, value: &str, kind: SettingKind) -> anyhow::Result<()> {
        sqlx::query(INSERT_SETTING)
            .bind(key)
            .bind(value)
            .bind(kind.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// All settings ordered by id.
    pub async fn list(&self) -> anyhow::Result<Vec<Setting>> {
        let rows = sqlx::query_as::<_, SettingRow>(
            "SELECT id, key, value, type FROM webguiSetting ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
pub(crate) async fn memory_store() -> SettingsStore {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    SettingsStore::init(&pool).await.unwrap();
    SettingsStore::new(pool)
}
