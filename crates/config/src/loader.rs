use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::WebguiConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["webgui.toml", "webgui.yaml", "webgui.yml", "webgui.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<WebguiConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Resolve the configuration for this process.
///
/// An explicit path must load successfully. Otherwise the search order is:
/// 1. `./webgui.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/webgui/webgui.{toml,yaml,yml,json}` (user-global)
///
/// A discovered file that fails to parse is logged and replaced by defaults.
pub fn discover_and_load(explicit: Option<&Path>) -> anyhow::Result<WebguiConfig> {
    if let Some(path) = explicit {
        debug!(path = %path.display(), "loading config");
        return load_config(path);
    }

    let mut search = vec![PathBuf::from(".")];
    search.extend(config_dir());

    let Some(path) = find_config_file(&search) else {
        debug!("no config file found, using defaults");
        return Ok(WebguiConfig::default());
    };

    debug!(path = %path.display(), "loading config");
    match load_config(&path) {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            Ok(WebguiConfig::default())
        },
    }
}

/// Returns the user-global config directory, `~/.config/webgui/`.
pub fn config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().join(".config").join("webgui"))
}

/// First existing config file across `dirs`, honouring [`CONFIG_FILENAMES`] order.
fn find_config_file(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)))
        .find(|p| p.exists())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<WebguiConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::schema::DEFAULT_PERMANENT_LIFETIME_SECS};

    #[test]
    fn loads_partial_toml_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("webgui.toml");
        std::fs::write(
            &path,
            "[session]\ncookie_name = \"sid\"\ncookie_domain = \"example.org\"\n",
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.session.cookie_name, "sid");
        assert_eq!(cfg.session.cookie_domain.as_deref(), Some("example.org"));
        assert_eq!(
            cfg.session.permanent_lifetime_secs,
            DEFAULT_PERMANENT_LIFETIME_SECS
        );
        assert_eq!(cfg.server.port, 8080);
    }

    #[test]
    fn loads_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("webgui.yaml");
        std::fs::write(&yaml, "server:\n  port: 9000\n").unwrap();
        assert_eq!(load_config(&yaml).unwrap().server.port, 9000);

        let json = dir.path().join("webgui.json");
        std::fs::write(&json, r#"{"database":{"url":"sqlite::memory:"}}"#).unwrap();
        assert_eq!(load_config(&json).unwrap().database.url, "sqlite::memory:");
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("webgui.ini");
        std::fs::write(&path, "port=1").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(discover_and_load(Some(&missing)).is_err());
    }

    #[test]
    fn find_prefers_filename_order_then_directory_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(second.path().join("webgui.toml"), "").unwrap();
        std::fs::write(first.path().join("webgui.json"), "{}").unwrap();
        std::fs::write(first.path().join("webgui.yaml"), "").unwrap();

        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(
            find_config_file(&dirs),
            Some(first.path().join("webgui.yaml"))
        );
    }

    #[test]
    fn find_returns_none_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_config_file(&[dir.path().to_path_buf()]).is_none());
    }
}
