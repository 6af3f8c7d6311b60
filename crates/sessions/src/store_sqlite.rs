use {async_trait::async_trait, time::OffsetDateTime, tracing::debug};

use crate::{
    record::{SessionRecord, from_millis, to_millis},
    store::SessionStore,
};

/// SQLite-backed session store.
#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: sqlx::SqlitePool,
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    sid: String,
    expired: i64,
    session: String,
}

impl TryFrom<SessionRow> for SessionRecord {
    type Error = anyhow::Error;

    fn try_from(r: SessionRow) -> anyhow::Result<Self> {
        Ok(Self {
            sid: r.sid,
            expired: from_millis(r.expired)?,
            session: r.session,
        })
    }
}

impl SqliteSessionStore {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the `sessions` table if it doesn't exist.
    pub async fn init(pool: &sqlx::SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS sessions (
                sid     TEXT PRIMARY KEY,
                expired INTEGER NOT NULL,
                session TEXT NOT NULL
            )"#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_expired ON sessions(expired)")
            .execute(pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn load(&self, sid: &str) -> anyhow::Result<Option<SessionRecord>> {
        sqlx::query_as::<_, SessionRow>("SELECT sid, expired, session FROM sessions WHERE sid = ?")
            .bind(sid)
            .fetch_optional(&self.pool)
            .await?
            .map(SessionRecord::try_from)
            .transpose()
    }

    async fn upsert(&self, record: &SessionRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO sessions (sid, expired, session)
               VALUES (?, ?, ?)
               ON CONFLICT(sid) DO UPDATE SET
                 expired = excluded.expired,
                 session = excluded.session"#,
        )
        .bind(&record.sid)
        .bind(to_millis(record.expired))
        .bind(&record.session)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, sid: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM sessions WHERE sid = ?")
            .bind(sid)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: OffsetDateTime) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM sessions WHERE expired < ?")
            .bind(to_millis(now))
            .execute(&self.pool)
            .await?;
        debug!(removed = res.rows_affected(), "deleted expired session rows");
        Ok(res.rows_affected())
    }

    async fn count(&self) -> anyhow::Result<u64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
            .fetch_one(&self.pool)
            .await?;
        Ok(n as u64)
    }

    async fn list(&self, offset: u64, limit: u64) -> anyhow::Result<Vec<SessionRecord>> {
        sqlx::query_as::<_, SessionRow>(
            "SELECT sid, expired, session FROM sessions ORDER BY expired ASC LIMIT ? OFFSET ?",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(SessionRecord::try_from)
        .collect()
    }
}

#[cfg(test)]
pub(crate) async fn memory_store() -> SqliteSessionStore {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    SqliteSessionStore::init(&pool).await.unwrap();
    SqliteSessionStore::new(pool)
}
