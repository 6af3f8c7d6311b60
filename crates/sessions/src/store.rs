/// Storage abstraction for session rows.
use {async_trait::async_trait, time::OffsetDateTime};

use crate::record::SessionRecord;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the row for `sid`, expired or not.
    async fn load(&self, sid: &str) -> anyhow::Result<Option<SessionRecord>>;

    /// Insert the row, or replace content and expiry of an existing one.
    async fn upsert(&self, record: &SessionRecord) -> anyhow::Result<()>;

    /// Delete the row for `sid`. Returns whether a row existed.
    async fn delete(&self, sid: &str) -> anyhow::Result<bool>;

    /// Delete every row whose expiry is before `now`. Returns the number removed.
    async fn delete_expired(&self, now: OffsetDateTime) -> anyhow::Result<u64>;

    async fn count(&self) -> anyhow::Result<u64>;

    /// Rows ordered by expiry, soonest first.
    async fn list(&self, offset: u64, limit: u64) -> anyhow::Result<Vec<SessionRecord>>;
}
