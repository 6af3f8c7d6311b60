use time::OffsetDateTime;

/// A persisted session row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub sid: String,
    /// Absolute expiry; the row is invalid once `now > expired`.
    pub expired: OffsetDateTime,
    /// JSON-encoded session mapping.
    pub session: String,
}

impl SessionRecord {
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now > self.expired
    }
}

/// Unix timestamp in milliseconds, the on-disk representation of `expired`.
pub fn to_millis(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn from_millis(ms: i64) -> anyhow::Result<OffsetDateTime> {
    Ok(OffsetDateTime::from_unix_timestamp_nanos(
        i128::from(ms) * 1_000_000,
    )?)
}
