use {
    axum::{Json, extract::State},
    serde::Deserialize,
    serde_json::{Map, Value, json},
    webgui_sessions::record::to_millis,
};

use crate::{ApiError, guard::USER_KEY, routes::PageArgs, state::AppState};

/// Visible settings with their raw values.
pub async fn get_all_settings(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let settings: Vec<_> = state
        .settings
        .list()
        .await?
        .into_iter()
        .filter(|s| !s.is_hidden())
        .collect();
    Ok(Json(json!({
        "status": "success",
        "setting": settings,
    })))
}

#[derive(Debug, Deserialize)]
pub struct SettingRequest {
    pub key: String,
}

/// One setting, resolved to its typed value. Hidden settings read as missing.
pub async fn get_setting(
    State(state): State<AppState>,
    Json(req): Json<SettingRequest>,
) -> Result<Json<Value>, ApiError> {
    let setting = state
        .settings
        .get(&req.key)
        .await?
        .filter(|s| !s.is_hidden())
        .ok_or_else(|| ApiError::SettingNotFound(req.key.clone()))?;
    let value = setting.typed_value()?;
    Ok(Json(json!({
        "status": "success",
        "key": setting.key,
        "type": setting.kind,
        "value": value.to_json(),
    })))
}

/// Number of stored session rows, expired ones included.
pub async fn session_count(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let count = state.session_store().count().await?;
    Ok(Json(json!({ "status": "success", "count": count })))
}

/// Paged session listing. Only a short id prefix is exposed.
pub async fn session_list(
    State(state): State<AppState>,
    page: PageArgs,
) -> Result<Json<Value>, ApiError> {
    let store = state.session_store();
    let total = store.count().await?;
    let rows = store.list(page.offset(), page.per_page).await?;

    let sessions: Vec<Value> = rows
        .into_iter()
        .map(|r| {
            let user = serde_json::from_str::<Map<String, Value>>(&r.session)
                .ok()
                .and_then(|mut m| m.remove(USER_KEY))
                .unwrap_or(Value::Null);
            json!({
                "sid": r.sid.chars().take(8).collect::<String>(),
                "user": user,
                "expired": to_millis(r.expired),
            })
        })
        .collect();

    Ok(Json(json!({
        "status": "success",
        "page": page.page,
        "perPage": page.per_page,
        "total": total,
        "sessions": sessions,
    })))
}
