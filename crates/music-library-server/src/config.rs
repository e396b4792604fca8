//! Configuration loading and parsing.
//!
//! Defines the server config schema and the persisted scan-path settings.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::library::WalkOptions;

/// Top-level server configuration loaded from TOML.
#[derive(Debug, Default, Deserialize)]
pub struct ServerConfig {
    /// Bind address (host:port).
    pub bind: Option<String>,
    /// SQLite catalog database path.
    pub database_path: Option<String>,
    /// Settings file holding the configured scan roots.
    pub settings_path: Option<String>,
    /// Initial scan roots used until a settings file exists.
    pub music_paths: Option<Vec<String>>,
    /// Scan traversal options.
    pub scan: Option<ScanConfig>,
    /// Static frontend directory override.
    pub web_dir: Option<String>,
}

/// Scan traversal options from TOML.
#[derive(Debug, Default, Deserialize)]
pub struct ScanConfig {
    /// Descend into subdirectories (default: true).
    pub recursive: Option<bool>,
    /// Descend into symlinked directories (default: false).
    pub follow_symlinks: Option<bool>,
}

impl ServerConfig {
    /// Load configuration from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            std::fs::read_to_string(path).with_context(|| format!("read config {:?}", path))?;
        let cfg = toml::from_str::<ServerConfig>(&raw)
            .with_context(|| format!("parse config {:?}", path))?;
        Ok(cfg)
    }
}

/// Parse an optional bind address from config.
pub fn bind_from_config(cfg: &ServerConfig) -> Result<Option<SocketAddr>> {
    let Some(bind) = cfg.bind.as_deref() else {
        return Ok(None);
    };
    let addr = bind.parse().with_context(|| format!("parse bind {bind}"))?;
    Ok(Some(addr))
}

/// Extract the catalog database path from config, with a default.
pub fn database_path_from_config(cfg: &ServerConfig) -> PathBuf {
    cfg.database_path
        .as_deref()
        .map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("music-library.sqlite"))
}

/// Resolve the scan settings file path: explicit config value, else a
/// `settings.toml` next to the config file, else one in the working directory.
pub fn settings_path_from_config(cfg: &ServerConfig, config_path: Option<&Path>) -> PathBuf {
    if let Some(raw) = cfg.settings_path.as_deref() {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    match config_path.and_then(Path::parent) {
        Some(dir) => dir.join("settings.toml"),
        None => PathBuf::from("settings.toml"),
    }
}

/// Resolve walk options from config.
pub fn walk_options_from_config(cfg: &ServerConfig) -> WalkOptions {
    let scan = cfg.scan.as_ref();
    WalkOptions {
        recursive: scan.and_then(|s| s.recursive).unwrap_or(true),
        follow_symlinks: scan.and_then(|s| s.follow_symlinks).unwrap_or(false),
    }
}

/// Scan settings persisted separately from the server config.
#[derive(Debug, Default, Deserialize)]
struct ScanSettings {
    paths: Option<Vec<String>>,
}

/// Load the configured scan roots. A missing settings file falls back to the
/// defaults from the server config; a present file wins even when empty.
pub fn load_scan_paths(settings_path: &Path, defaults: &[String]) -> Result<Vec<String>> {
    let raw = match std::fs::read_to_string(settings_path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(defaults.to_vec());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("read settings {:?}", settings_path));
        }
    };
    let settings = toml::from_str::<ScanSettings>(&raw)
        .with_context(|| format!("parse settings {:?}", settings_path))?;
    Ok(settings.paths.unwrap_or_default())
}

/// Rewrite the scan roots in the settings file, preserving unrelated keys.
pub fn update_scan_paths(settings_path: &Path, paths: &[String]) -> Result<()> {
    let raw = match std::fs::read_to_string(settings_path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(err) => {
            return Err(err).with_context(|| format!("read settings {:?}", settings_path));
        }
    };
    let mut doc = raw
        .parse::<toml_edit::DocumentMut>()
        .with_context(|| format!("parse settings {:?}", settings_path))?;

    let mut arr = toml_edit::Array::new();
    for path in paths {
        arr.push(path.as_str());
    }
    doc["paths"] = toml_edit::value(arr);

    std::fs::write(settings_path, doc.to_string())
        .with_context(|| format!("write settings {:?}", settings_path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "music-library-config-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir.join(name)
    }

    #[test]
    fn parse_full_config() {
        let cfg: ServerConfig = toml::from_str(
            r#"
            bind = "127.0.0.1:3001"
            database_path = "/data/catalog.sqlite"
            music_paths = ["/music"]

            [scan]
            recursive = false
            follow_symlinks = true
            "#,
        )
        .expect("parse config");
        assert_eq!(
            bind_from_config(&cfg).unwrap(),
            Some("127.0.0.1:3001".parse().unwrap())
        );
        assert_eq!(
            database_path_from_config(&cfg),
            PathBuf::from("/data/catalog.sqlite")
        );
        let options = walk_options_from_config(&cfg);
        assert!(!options.recursive);
        assert!(options.follow_symlinks);
    }

    #[test]
    fn defaults_apply_when_config_is_empty() {
        let cfg = ServerConfig::default();
        assert_eq!(bind_from_config(&cfg).unwrap(), None);
        assert_eq!(
            database_path_from_config(&cfg),
            PathBuf::from("music-library.sqlite")
        );
        let options = walk_options_from_config(&cfg);
        assert!(options.recursive);
        assert!(!options.follow_symlinks);
    }

    #[test]
    fn settings_path_defaults_next_to_config() {
        let cfg = ServerConfig::default();
        let path = settings_path_from_config(&cfg, Some(Path::new("/etc/mls/config.toml")));
        assert_eq!(path, PathBuf::from("/etc/mls/settings.toml"));
    }

    #[test]
    fn missing_settings_file_falls_back_to_defaults() {
        let path = temp_file("settings.toml");
        let defaults = vec!["/music".to_string()];
        let paths = load_scan_paths(&path, &defaults).expect("load settings");
        assert_eq!(paths, defaults);
    }

    #[test]
    fn present_settings_file_wins_even_when_empty() {
        let path = temp_file("settings.toml");
        std::fs::write(&path, "paths = []\n").expect("write settings");
        let defaults = vec!["/music".to_string()];
        let paths = load_scan_paths(&path, &defaults).expect("load settings");
        assert!(paths.is_empty());
    }

    #[test]
    fn update_scan_paths_round_trips() {
        let path = temp_file("settings.toml");
        let paths = vec!["/music".to_string(), "/more/music".to_string()];
        update_scan_paths(&path, &paths).expect("write settings");
        let loaded = load_scan_paths(&path, &[]).expect("load settings");
        assert_eq!(loaded, paths);
    }

    #[test]
    fn update_scan_paths_preserves_unrelated_keys() {
        let path = temp_file("settings.toml");
        std::fs::write(&path, "# scanner settings\nother = 1\n").expect("seed settings");
        update_scan_paths(&path, &["/music".to_string()]).expect("write settings");
        let raw = std::fs::read_to_string(&path).expect("read settings");
        assert!(raw.contains("other = 1"));
        assert!(raw.contains("/music"));
    }
}
