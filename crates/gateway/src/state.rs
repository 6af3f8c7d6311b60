use std::sync::Arc;

use {
    webgui_config::WebguiConfig,
    webgui_sessions::{SessionInterface, SessionStore},
    webgui_settings::SettingsStore,
};

/// Shared application state, built once at startup and cloned into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<WebguiConfig>,
    pub sessions: Arc<SessionInterface>,
    pub settings: SettingsStore,
    /// Server version string.
    pub version: &'static str,
}

impl AppState {
    pub fn new(
        config: WebguiConfig,
        store: Arc<dyn SessionStore>,
        settings: SettingsStore,
    ) -> Self {
        let sessions = Arc::new(SessionInterface::new(store, &config.session));
        Self {
            config: Arc::new(config),
            sessions,
            settings,
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    pub fn session_store(&self) -> &Arc<dyn SessionStore> {
        self.sessions.store()
    }
}
