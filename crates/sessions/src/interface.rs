use std::sync::Arc;

use {
    anyhow::Context,
    serde_json::Map,
    time::{Duration, OffsetDateTime},
    tracing::debug,
    webgui_config::SessionConfig,
};

use crate::{handle::DbSession, record::SessionRecord, store::SessionStore};

/// Idle timeout applied to sessions that are not permanent.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::minutes(10);

/// What the HTTP layer should do with the session cookie after a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCookie {
    /// Set `name=value` with the given expiry, `HttpOnly`.
    Set {
        name: String,
        value: String,
        expires: OffsetDateTime,
        domain: Option<String>,
    },
    /// Remove the cookie from the client.
    Clear {
        name: String,
        domain: Option<String>,
    },
    /// Leave the cookie alone.
    Unchanged,
}

/// Maps session cookies to rows in a [`SessionStore`].
pub struct SessionInterface {
    store: Arc<dyn SessionStore>,
    cookie_name: String,
    cookie_domain: Option<String>,
    permanent_lifetime: Duration,
}

impl SessionInterface {
    pub fn new(store: Arc<dyn SessionStore>, config: &SessionConfig) -> Self {
        let secs = i64::try_from(config.permanent_lifetime_secs).unwrap_or(i64::MAX);
        Self {
            store,
            cookie_name: config.cookie_name.clone(),
            cookie_domain: config.cookie_domain.clone(),
            permanent_lifetime: Duration::seconds(secs),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn generate_sid() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Expiry a save at `now` would assign to `session`.
    pub fn expiration_at(&self, session: &DbSession, now: OffsetDateTime) -> OffsetDateTime {
        if session.is_permanent() {
            now.saturating_add(self.permanent_lifetime)
        } else {
            now + DEFAULT_IDLE_TIMEOUT
        }
    }

    /// Build the session for a request carrying `sid` (the cookie value, if any).
    ///
    /// Never writes to storage.
    pub async fn open(&self, sid: Option<&str>) -> anyhow::Result<DbSession> {
        self.open_at(sid, OffsetDateTime::now_utc()).await
    }

    pub async fn open_at(
        &self,
        sid: Option<&str>,
        now: OffsetDateTime,
    ) -> anyhow::Result<DbSession> {
        let Some(sid) = sid.filter(|s| !s.is_empty()) else {
            return Ok(DbSession::new(Self::generate_sid(), Map::new(), true));
        };

        let record = match self.store.load(sid).await? {
            Some(record) if record.is_expired_at(now) => {
                debug!(sid, "session row expired, starting empty");
                return Ok(DbSession::new(sid, Map::new(), false));
            },
            Some(record) => record,
            None => {
                debug!(sid, "unknown session id, starting empty");
                return Ok(DbSession::new(sid, Map::new(), false));
            },
        };

        let data = serde_json::from_str(&record.session)
            .with_context(|| format!("malformed session blob for {sid}"))?;
        Ok(DbSession::new(sid, data, false))
    }

    /// Persist `session` and report the cookie change the response needs.
    pub async fn save(&self, session: &DbSession) -> anyhow::Result<SessionCookie> {
        self.save_at(session, OffsetDateTime::now_utc()).await
    }

    pub async fn save_at(
        &self,
        session: &DbSession,
        now: OffsetDateTime,
    ) -> anyhow::Result<SessionCookie> {
        if session.is_empty() {
            if !session.is_modified() {
                return Ok(SessionCookie::Unchanged);
            }
            let existed = self.store.delete(session.sid()).await?;
            debug!(sid = session.sid(), existed, "session emptied, row deleted");
            return Ok(SessionCookie::Clear {
                name: self.cookie_name.clone(),
                domain: self.cookie_domain.clone(),
            });
        }

        let expires = self.expiration_at(session, now);
        let record = SessionRecord {
            sid: session.sid().to_string(),
            expired: expires,
            session: serde_json::to_string(session.data())?,
        };
        self.store.upsert(&record).await?;

        Ok(SessionCookie::Set {
            name: self.cookie_name.clone(),
            value: record.sid,
            expires,
            domain: self.cookie_domain.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{record::to_millis, store_sqlite::memory_store},
        serde_json::json,
    };

    async fn interface() -> SessionInterface {
        SessionInterface::new(Arc::new(memory_store().await), &SessionConfig::default())
    }

    fn config_with_domain() -> SessionConfig {
        SessionConfig {
            cookie_name: "sid".into(),
            cookie_domain: Some("example.org".into()),
            permanent_lifetime_secs: 3600,
        }
    }

    #[tokio::test]
    async fn open_without_cookie_generates_new_session() {
        let iface = interface().await;
        let a = iface.open(None).await.unwrap();
        let b = iface.open(Some("")).await.unwrap();

        assert!(a.is_new() && b.is_new());
        assert!(a.is_empty());
        assert!(!a.sid().is_empty());
        assert_ne!(a.sid(), b.sid());
        assert_eq!(iface.store().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn open_unknown_sid_is_empty_and_keeps_id() {
        let iface = interface().await;
        let s = iface.open(Some("abc-123")).await.unwrap();
        assert_eq!(s.sid(), "abc-123");
        assert!(s.is_empty());
        assert!(!s.is_new());
    }

    #[tokio::test]
    async fn save_then_open_round_trips() {
        let iface = interface().await;
        let mut s = iface.open(None).await.unwrap();
        s.insert("user", json!("alice"));
        s.insert("cart", json!({"items": [1, 2, 3]}));
        iface.save(&s).await.unwrap();

        let reopened = iface.open(Some(s.sid())).await.unwrap();
        assert_eq!(reopened.data(), s.data());
        assert!(!reopened.is_new());
        assert!(!reopened.is_modified());
    }

    #[tokio::test]
    async fn unknown_sid_scenario_persists_row_and_sets_cookie() {
        let store = Arc::new(memory_store().await);
        let iface = SessionInterface::new(store.clone(), &config_with_domain());
        let now = OffsetDateTime::now_utc();

        let mut s = iface.open_at(Some("abc-123"), now).await.unwrap();
        assert!(s.data().is_empty());
        s.insert("user", json!("alice"));

        let cookie = iface.save_at(&s, now).await.unwrap();
        let expected_expiry = now + Duration::minutes(10);
        assert_eq!(cookie, SessionCookie::Set {
            name: "sid".into(),
            value: "abc-123".into(),
            expires: expected_expiry,
            domain: Some("example.org".into()),
        });

        let row = store.load("abc-123").await.unwrap().unwrap();
        assert_eq!(row.session, r#"{"user":"alice"}"#);
        assert_eq!(to_millis(row.expired), to_millis(expected_expiry));
    }

    #[tokio::test]
    async fn emptied_session_deletes_row_and_clears_cookie() {
        let iface = interface().await;
        let mut s = iface.open(None).await.unwrap();
        s.insert("user", json!("alice"));
        iface.save(&s).await.unwrap();

        let mut s = iface.open(Some(s.sid())).await.unwrap();
        s.clear();
        let cookie = iface.save(&s).await.unwrap();
        assert_eq!(cookie, SessionCookie::Clear {
            name: "session".into(),
            domain: None,
        });
        assert!(iface.store().load(s.sid()).await.unwrap().is_none());

        let reopened = iface.open(Some(s.sid())).await.unwrap();
        assert!(reopened.is_empty());
        assert!(!reopened.is_new());
    }

    #[tokio::test]
    async fn untouched_empty_session_is_noop() {
        let iface = interface().await;
        let s = iface.open(None).await.unwrap();
        assert_eq!(iface.save(&s).await.unwrap(), SessionCookie::Unchanged);
        assert_eq!(iface.store().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn resaving_unchanged_content_keeps_blob_and_extends_expiry() {
        let iface = interface().await;
        let now = OffsetDateTime::now_utc();
        let mut s = iface.open_at(None, now).await.unwrap();
        s.insert("user", json!("alice"));

        iface.save_at(&s, now).await.unwrap();
        let first = iface.store().load(s.sid()).await.unwrap().unwrap();

        let later = now + Duration::minutes(5);
        let s = iface.open_at(Some(s.sid()), later).await.unwrap();
        iface.save_at(&s, later).await.unwrap();
        let second = iface.store().load(s.sid()).await.unwrap().unwrap();

        assert_eq!(first.session, second.session);
        assert!(second.expired > first.expired);
        assert_eq!(iface.store().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn permanent_session_uses_configured_lifetime() {
        let iface = SessionInterface::new(Arc::new(memory_store().await), &config_with_domain());
        let now = OffsetDateTime::now_utc();
        let mut s = iface.open_at(None, now).await.unwrap();
        s.insert("user", json!("alice"));
        assert_eq!(iface.expiration_at(&s, now), now + DEFAULT_IDLE_TIMEOUT);

        s.set_permanent(true);
        assert_eq!(iface.expiration_at(&s, now), now + Duration::hours(1));

        let reopened = {
            iface.save_at(&s, now).await.unwrap();
            iface.open_at(Some(s.sid()), now).await.unwrap()
        };
        assert!(reopened.is_permanent());
    }

    #[tokio::test]
    async fn expired_row_opens_empty() {
        let iface = interface().await;
        let now = OffsetDateTime::now_utc();
        let mut s = iface.open_at(None, now).await.unwrap();
        s.insert("user", json!("alice"));
        iface.save_at(&s, now).await.unwrap();

        let after = now + DEFAULT_IDLE_TIMEOUT + Duration::seconds(1);
        let reopened = iface.open_at(Some(s.sid()), after).await.unwrap();
        assert!(reopened.is_empty());
        assert_eq!(reopened.sid(), s.sid());
    }

    #[tokio::test]
    async fn malformed_blob_is_an_error() {
        let iface = interface().await;
        iface
            .store()
            .upsert(&SessionRecord {
                sid: "bad".into(),
                expired: OffsetDateTime::now_utc() + Duration::minutes(1),
                session: "not json".into(),
            })
            .await
            .unwrap();

        assert!(iface.open(Some("bad")).await.is_err());
    }
}
