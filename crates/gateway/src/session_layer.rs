use std::sync::Arc;

use {
    axum::{
        extract::{FromRequestParts, Request, State},
        http::request::Parts,
        middleware::Next,
        response::{IntoResponse, Response},
    },
    axum_extra::extract::cookie::{Cookie, CookieJar},
    serde::Serialize,
    serde_json::Value,
    tokio::sync::{Mutex, MutexGuard},
    tracing::error,
    webgui_sessions::{DbSession, SessionCookie, SessionInterface},
};

use crate::{ApiError, guard::Role};

/// Request-scoped handle to the current session.
///
/// Shared between the session middleware and whichever handlers run inside it;
/// the middleware persists the final state once the handler returns.
#[derive(Clone)]
pub struct Session(Arc<Mutex<DbSession>>);

impl Session {
    pub fn new(inner: DbSession) -> Self {
        Self(Arc::new(Mutex::new(inner)))
    }

    pub async fn lock(&self) -> MutexGuard<'_, DbSession> {
        self.0.lock().await
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.lock().await.get(key).cloned()
    }

    pub async fn insert(&self, key: &str, value: impl Serialize) -> serde_json::Result<()> {
        let value = serde_json::to_value(value)?;
        self.lock().await.insert(key, value);
        Ok(())
    }

    pub async fn clear(&self) {
        self.lock().await.clear();
    }

    pub async fn set_permanent(&self, permanent: bool) {
        self.lock().await.set_permanent(permanent);
    }

    pub async fn role(&self) -> Role {
        Role::of(&*self.lock().await)
    }

    async fn snapshot(&self) -> DbSession {
        self.lock().await.clone()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(ApiError::SessionLayerMissing)
    }
}

/// Open the session before the handler runs and save it afterwards.
pub async fn session_middleware(
    State(sessions): State<Arc<SessionInterface>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let sid = jar.get(sessions.cookie_name()).map(|c| c.value().to_string());
    let opened = match sessions.open(sid.as_deref()).await {
        Ok(s) => s,
        Err(e) => return ApiError::Internal(e).into_response(),
    };

    let session = Session::new(opened);
    req.extensions_mut().insert(session.clone());
    let response = next.run(req).await;

    let state = session.snapshot().await;
    match sessions.save(&state).await {
        Ok(cookie) => (apply_cookie(jar, cookie), response).into_response(),
        Err(e) => {
            error!(sid = state.sid(), error = %e, "failed to save session");
            ApiError::Internal(e).into_response()
        },
    }
}

fn apply_cookie(jar: CookieJar, cookie: SessionCookie) -> CookieJar {
    match cookie {
        SessionCookie::Set {
            name,
            value,
            expires,
            domain,
        } => {
            let mut c = Cookie::build((name, value))
                .path("/")
                .http_only(true)
                .expires(expires);
            if let Some(domain) = domain {
                c = c.domain(domain);
            }
            jar.add(c)
        },
        SessionCookie::Clear { name, domain } => {
            let mut c = Cookie::build((name, String::new())).path("/");
            if let Some(domain) = domain {
                c = c.domain(domain);
            }
            jar.remove(c)
        },
        SessionCookie::Unchanged => jar,
    }
}
