use {
    axum::{Json, response::IntoResponse},
    serde::Deserialize,
    serde_json::{Value, json},
};

use crate::{guard::USER_KEY, session_layer::Session};

/// Current user and role.
pub async fn profile(session: Session) -> impl IntoResponse {
    let user = session.get(USER_KEY).await.unwrap_or(Value::Null);
    Json(json!({
        "status": "success",
        "user": user,
        "role": session.role().await,
    }))
}

/// Drop everything in the session; the middleware deletes the row and cookie.
pub async fn logout(session: Session) -> impl IntoResponse {
    session.clear().await;
    Json(json!({ "status": "success" }))
}

#[derive(Debug, Deserialize)]
pub struct RememberRequest {
    pub permanent: bool,
}

/// Switch between the idle timeout and the long-lived permanent lifetime.
pub async fn remember(session: Session, Json(req): Json<RememberRequest>) -> impl IntoResponse {
    session.set_permanent(req.permanent).await;
    Json(json!({ "status": "success", "permanent": req.permanent }))
}
