use {
    axum::{
        Json,
        extract::{Request, State},
        middleware::Next,
        response::{IntoResponse, Response},
    },
    serde::Serialize,
    serde_json::{Value, json},
    tracing::debug,
    webgui_sessions::DbSession,
};

use crate::session_layer::Session;

/// Session key holding the signed-in user's identity.
pub const USER_KEY: &str = "user";
/// Session key holding the signed-in user's role (`"admin"` for managers).
pub const ROLE_KEY: &str = "role";

/// Capability required to reach a route, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Anonymous,
    User,
    Admin,
}

impl Role {
    /// Role of whoever owns `session`.
    pub fn of(session: &DbSession) -> Self {
        if !session.contains_key(USER_KEY) {
            return Self::Anonymous;
        }
        match session.get(ROLE_KEY) {
            Some(Value::String(r)) if r == "admin" => Self::Admin,
            _ => Self::User,
        }
    }

    pub fn satisfies(self, required: Role) -> bool {
        self >= required
    }
}

/// Generic failure body returned by gates. Sent with 200 so existing
/// frontends, which branch on `status`, keep working.
pub fn bad_request() -> Response {
    Json(json!({ "status": "Bad Request" })).into_response()
}

/// Middleware rejecting requests whose session lacks the `required` role.
pub async fn require_role(
    State(required): State<Role>,
    session: Session,
    req: Request,
    next: Next,
) -> Response {
    let role = session.role().await;
    if role.satisfies(required) {
        return next.run(req).await;
    }
    debug!(
        path = %req.uri().path(),
        ?required,
        ?role,
        "request rejected by role gate"
    );
    bad_request()
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::Map};

    fn session(pairs: &[(&str, Value)]) -> DbSession {
        let mut data = Map::new();
        for (k, v) in pairs {
            data.insert(k.to_string(), v.clone());
        }
        DbSession::new("sid", data, false)
    }

    #[test]
    fn role_from_session_contents() {
        assert_eq!(Role::of(&session(&[])), Role::Anonymous);
        assert_eq!(
            Role::of(&session(&[("role", json!("admin"))])),
            Role::Anonymous
        );
        assert_eq!(Role::of(&session(&[("user", json!("alice"))])), Role::User);
        assert_eq!(
            Role::of(&session(&[("user", json!("root")), ("role", json!("admin"))])),
            Role::Admin
        );
    }

    #[test]
    fn satisfies_is_ordered() {
        assert!(Role::Admin.satisfies(Role::User));
        assert!(Role::User.satisfies(Role::User));
        assert!(Role::User.satisfies(Role::Anonymous));
        assert!(!Role::User.satisfies(Role::Admin));
        assert!(!Role::Anonymous.satisfies(Role::User));
    }
}
