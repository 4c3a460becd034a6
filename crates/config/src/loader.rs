use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, info},
};

use crate::{env_subst::substitute_env, schema::RelayConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["instarelay.toml", "instarelay.json"];

/// Env var holding the bot token. Takes precedence over the file.
const TOKEN_ENV: &str = "BOT_TOKEN";

/// Env var overriding `storage.work_dir`.
const WORK_DIR_ENV: &str = "INSTARELAY_WORK_DIR";

/// Load config from the given path, expanding `${ENV}` placeholders.
pub fn load_config(path: &Path) -> anyhow::Result<RelayConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    parse_config(&substitute_env(&raw), path)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./instarelay.{toml,json}` (working directory)
/// 2. `<user config dir>/instarelay.{toml,json}`
///
/// Returns `RelayConfig::default()` when no file exists. A file that exists
/// but does not parse is an error.
pub fn discover_and_load() -> anyhow::Result<RelayConfig> {
    match find_config_file() {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            load_config(&path)
        },
        None => {
            debug!("no config file found, using defaults");
            Ok(RelayConfig::default())
        },
    }
}

/// Apply environment overrides from the process environment.
pub fn apply_env_overrides(config: &mut RelayConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

/// Apply `BOT_TOKEN` and `INSTARELAY_WORK_DIR` using a custom lookup.
///
/// Blank values are ignored so an empty variable cannot wipe a token set in
/// the file.
pub fn apply_env_overrides_with(
    config: &mut RelayConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(token) = non_blank(TOKEN_ENV) {
        debug!("bot token taken from {TOKEN_ENV}");
        config.telegram.token = Secret::new(token.trim().to_string());
    }
    if let Some(dir) = non_blank(WORK_DIR_ENV) {
        config.storage.work_dir = Some(PathBuf::from(dir));
    }
}

/// Returns the user config directory (`~/.config/instarelay/` on Linux).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "instarelay").map(|d| d.config_dir().to_path_buf())
}

fn find_config_file() -> Option<PathBuf> {
    find_in(Path::new(".")).or_else(|| config_dir().and_then(|dir| find_in(&dir)))
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<RelayConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn loads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("instarelay.toml");
        std::fs::write(
            &path,
            "[telegram]\ntoken = \"42:file\"\npoll_timeout_secs = 10\n",
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.telegram.token.expose_secret(), "42:file");
        assert_eq!(cfg.telegram.poll_timeout_secs, 10);
    }

    #[test]
    fn loads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("instarelay.json");
        std::fs::write(&path, r#"{"storage": {"work_dir": "/tmp/relay"}}"#).unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.storage.work_dir, Some(PathBuf::from("/tmp/relay")));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("instarelay.ini");
        std::fs::write(&path, "").unwrap();

        let err = load_config(&path).unwrap_err().to_string();
        assert!(err.contains("unsupported config format"), "{err}");
    }

    #[test]
    fn malformed_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("instarelay.toml");
        std::fs::write(&path, "[telegram\n").unwrap();

        let err = load_config(&path).unwrap_err().to_string();
        assert!(err.contains("instarelay.toml"), "{err}");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join("instarelay.toml")).is_err());
    }

    #[test]
    fn finds_first_candidate_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_in(dir.path()), None);

        std::fs::write(dir.path().join("instarelay.json"), "{}").unwrap();
        assert_eq!(
            find_in(dir.path()),
            Some(dir.path().join("instarelay.json"))
        );

        std::fs::write(dir.path().join("instarelay.toml"), "").unwrap();
        assert_eq!(
            find_in(dir.path()),
            Some(dir.path().join("instarelay.toml"))
        );
    }

    #[test]
    fn env_token_overrides_file() {
        let mut cfg: RelayConfig = toml::from_str("[telegram]\ntoken = \"42:file\"").unwrap();
        apply_env_overrides_with(
            &mut cfg,
            env(&[("BOT_TOKEN", " 42:env \n"), ("INSTARELAY_WORK_DIR", "/var/relay")]),
        );
        assert_eq!(cfg.telegram.token.expose_secret(), "42:env");
        assert_eq!(cfg.storage.work_dir, Some(PathBuf::from("/var/relay")));
    }

    #[test]
    fn blank_env_keeps_file_values() {
        let mut cfg: RelayConfig = toml::from_str("[telegram]\ntoken = \"42:file\"").unwrap();
        apply_env_overrides_with(&mut cfg, env(&[("BOT_TOKEN", "  ")]));
        assert_eq!(cfg.telegram.token.expose_secret(), "42:file");
        assert_eq!(cfg.storage.work_dir, None);
    }
}
