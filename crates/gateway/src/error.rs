use {
    axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    serde_json::json,
    tracing::error,
    webgui_settings::SettingError,
};

/// Errors surfaced by handlers and middleware.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("session middleware is not installed")]
    SessionLayerMissing,
    #[error("setting not found: {0}")]
    SettingNotFound(String),
    #[error(transparent)]
    Setting(#[from] SettingError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::SettingNotFound(_) => StatusCode::NOT_FOUND,
            Self::SessionLayerMissing | Self::Setting(_) | Self::Internal(_) => {
                error!(error = %self, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            },
        };
        let body = Json(json!({
            "status": "error",
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
