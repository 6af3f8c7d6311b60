use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Router,
        extract::State,
        middleware,
        response::{IntoResponse, Json},
        routing::{get, post},
    },
    tower_http::{
        cors::{Any, CorsLayer},
        trace::TraceLayer,
    },
    tracing::info,
    webgui_common::{HookRegistry, LifecycleEvent},
    webgui_config::WebguiConfig,
    webgui_sessions::{SessionStore, SqliteSessionStore, register_expiry_sweep},
    webgui_settings::{SettingsStore, register_seed_defaults},
};

use crate::{
    admin_api, db, routes::ApiRoutes, session_layer::session_middleware, state::AppState,
    user_api,
};

// ── Router ───────────────────────────────────────────────────────────────────

/// The `/api` tree: user and admin endpoints behind their role gates.
pub fn api_routes() -> ApiRoutes<AppState> {
    ApiRoutes::new()
        .user("/profile", get(user_api::profile))
        .user("/logout", post(user_api::logout))
        .user("/session/permanent", post(user_api::remember))
        .admin("/setting/getAll", post(admin_api::get_all_settings))
        .admin("/setting/get", post(admin_api::get_setting))
        .admin("/session/count", post(admin_api::session_count))
        .admin("/session/list", post(admin_api::session_list))
}

/// Build the application router (shared between production startup and tests).
pub fn build_app(state: AppState) -> Router {
    build_app_with(state, api_routes())
}

/// Like [`build_app`], with a caller-supplied `/api` tree.
pub fn build_app_with(state: AppState, api: ApiRoutes<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api.build())
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.sessions),
            session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ── Startup ──────────────────────────────────────────────────────────────────

/// Connect storage, create tables and run the `AfterCreateDb` hooks.
pub async fn prepare(config: WebguiConfig) -> anyhow::Result<AppState> {
    let pool = db::connect(&config.database.url).await?;
    db::create_tables(&pool).await?;

    let store: Arc<dyn SessionStore> = Arc::new(SqliteSessionStore::new(pool.clone()));
    let settings = SettingsStore::new(pool);

    let mut hooks = HookRegistry::new();
    register_expiry_sweep(&mut hooks, Arc::clone(&store));
    register_seed_defaults(&mut hooks, settings.clone());
    hooks.dispatch(LifecycleEvent::AfterCreateDb).await;

    Ok(AppState::new(config, store, settings))
}

/// Start the HTTP server and block until it exits.
pub async fn start(config: WebguiConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let state = prepare(config).await?;
    let sessions = state.session_store().count().await?;

    let lines = [
        format!("webgui v{}", state.version),
        format!("listening on {addr}"),
        format!("database: {}", state.config.database.url),
        format!("sessions: {sessions} stored"),
    ];
    let width = lines.iter().map(|l| l.len()).max().unwrap_or(0) + 4;
    info!("┌{}┐", "─".repeat(width));
    for line in &lines {
        info!("│  {:<w$}│", line, w = width - 2);
    }
    info!("└{}┘", "─".repeat(width));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, build_app(state)).await?;
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": state.version,
    }))
}
