use {
    anyhow::Result,
    clap::Subcommand,
    serde_json::Value,
    sqlx::SqlitePool,
    webgui_config::WebguiConfig,
    webgui_gateway::db,
    webgui_sessions::{SessionStore, SqliteSessionStore, clear_expired},
    webgui_settings::SettingsStore,
};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Print the number of stored session rows.
    Count,
    /// Delete expired session rows now.
    Sweep,
}

#[derive(Subcommand)]
pub enum SettingAction {
    /// Print every setting with its resolved value.
    List,
}

pub async fn handle_sessions(config: &WebguiConfig, action: SessionAction) -> Result<()> {
    let store = SqliteSessionStore::new(open_pool(config).await?);
    match action {
        SessionAction::Count => println!("{}", store.count().await?),
        SessionAction::Sweep => {
            let removed = clear_expired(&store).await?;
            println!("removed {removed} expired session(s)");
        },
    }
    Ok(())
}

pub async fn handle_settings(config: &WebguiConfig, action: SettingAction) -> Result<()> {
    let store = SettingsStore::new(open_pool(config).await?);
    match action {
        SettingAction::List => {
            for (key, kind, value) in setting_lines(&store).await? {
                println!("{key:<32} {kind:<8} {value}");
            }
        },
    }
    Ok(())
}

async fn open_pool(config: &WebguiConfig) -> Result<SqlitePool> {
    let pool = db::connect(&config.database.url).await?;
    db::create_tables(&pool).await?;
    Ok(pool)
}

/// `(key, type, value)` triples; values that fail to resolve show the error.
async fn setting_lines(store: &SettingsStore) -> Result<Vec<(String, &'static str, String)>> {
    Ok(store
        .list()
        .await?
        .into_iter()
        .map(|s| {
            let value = match s.typed_value() {
                Ok(v) => match v.to_json() {
                    Value::String(text) => text,
                    other => other.to_string(),
                },
                Err(e) => format!("<{e}>"),
            };
            (s.key, s.kind.as_str(), value)
        })
        .collect())
}
