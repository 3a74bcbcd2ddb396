//! Configuration loader - handles TOML config hierarchy

use super::{Config, Deployment};
use crate::http::ResolverMode;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

impl Config {
    /// Load configuration with precedence:
    /// 1. CLI arguments (handled separately via with_cli_overrides)
    /// 2. Environment variables (AGRISENSE_*)
    /// 3. ./agrisense.toml or ./.agrisense.toml (project local)
    /// 4. ~/agrisense.toml (home directory)
    /// 5. ~/.config/agrisense/config.toml (XDG config)
    /// 6. Defaults (hardcoded)
    pub fn load() -> Result<Self> {
        // Load in reverse precedence order (lowest first, higher overwrites)
        let candidates = [
            Self::find_xdg_config(),
            Self::find_home_config(),
            Self::find_local_config(),
        ];
        let mut layers = Vec::new();
        for path in candidates.into_iter().flatten() {
            match Self::load_layer(&path) {
                Ok(layer) => {
                    debug!(path = %path.display(), "loaded config file");
                    layers.push(layer);
                }
                Err(e) => warn!(path = %path.display(), "ignoring unreadable config: {}", e),
            }
        }

        let config = Self::from_layers(layers)?;
        Ok(Self::apply_env_overrides(config))
    }

    /// Find XDG config file
    /// On Linux: ~/.config/agrisense/config.toml
    /// On macOS: ~/Library/Application Support/agrisense/config.toml OR ~/.config/agrisense/config.toml
    /// On Windows: C:\Users\<user>\AppData\Roaming\agrisense\config.toml
    fn find_xdg_config() -> Option<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("agrisense").join("config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        #[cfg(target_os = "macos")]
        {
            if let Some(home) = dirs::home_dir() {
                let path = home.join(".config").join("agrisense").join("config.toml");
                if path.exists() {
                    return Some(path);
                }
            }
        }

        None
    }

    /// Find home directory config
    fn find_home_config() -> Option<PathBuf> {
        let path = dirs::home_dir()?.join("agrisense.toml");
        path.exists().then_some(path)
    }

    /// Find project local config
    fn find_local_config() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        ["agrisense.toml", ".agrisense.toml"]
            .iter()
            .map(|name| cwd.join(name))
            .find(|path| path.exists())
    }

    /// Read one config file as a raw table. Files whose values don't fit
    /// the config schema are rejected here, before any merging.
    fn load_layer(path: &Path) -> Result<toml::Table> {
        let content = std::fs::read_to_string(path)?;
        let layer: toml::Table = toml::from_str(&content)?;
        toml::Value::Table(layer.clone()).try_into::<Config>()?;
        Ok(layer)
    }

    /// Merge layers (later ones win key by key) and fill in defaults
    fn from_layers(layers: Vec<toml::Table>) -> Result<Config> {
        let merged = layers.into_iter().fold(toml::Table::new(), merge_tables);
        Ok(toml::Value::Table(merged).try_into()?)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(config: Config) -> Config {
        Self::apply_overrides_from(config, |key| std::env::var(key).ok())
    }

    fn apply_overrides_from(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
        // === API settings ===
        if let Some(url) = var("AGRISENSE_BASE_URL") {
            config.api.base_url = url;
        }
        if let Some(path) = var("AGRISENSE_API_PATH") {
            config.api.path = path;
        }
        if let Some(timeout) = var("AGRISENSE_TIMEOUT").and_then(|v| v.parse().ok()) {
            config.api.timeout = timeout;
        }
        if let Some(timeout) = var("AGRISENSE_CONNECT_TIMEOUT").and_then(|v| v.parse().ok()) {
            config.api.connect_timeout = timeout;
        }
        if let Some(val) = var("AGRISENSE_DEPLOYMENT") {
            match Deployment::parse(&val) {
                Some(deployment) => config.api.deployment = deployment,
                None => warn!("unknown AGRISENSE_DEPLOYMENT '{}', keeping {:?}", val, config.api.deployment),
            }
        }

        // === Network settings ===
        if let Some(val) = var("AGRISENSE_RESOLVER") {
            match ResolverMode::parse(&val) {
                Some(mode) => config.network.resolver = mode,
                None => warn!("unknown AGRISENSE_RESOLVER '{}', keeping {:?}", val, config.network.resolver),
            }
        }
        if let Some(val) = var("AGRISENSE_DNS_FALLBACK") {
            config.network.dns_fallback = parse_bool(&val);
        }
        if let Some(url) = var("AGRISENSE_DOH_URL") {
            config.network.doh_url = url;
        }

        // === Weather settings ===
        if let Some(val) = var("AGRISENSE_WEATHER_ENRICH") {
            config.weather.enrich = parse_bool(&val);
        }
        if let Some(url) = var("AGRISENSE_ARCHIVE_URL") {
            config.weather.archive_url = url;
        }

        // === Location ===
        if let Some(lat) = var("AGRISENSE_LATITUDE").and_then(|v| v.parse().ok()) {
            config.location.latitude = Some(lat);
        }
        if let Some(lon) = var("AGRISENSE_LONGITUDE").and_then(|v| v.parse().ok()) {
            config.location.longitude = Some(lon);
        }
        if let Some(val) = var("AGRISENSE_SHARE_LOCATION") {
            config.location.share = parse_bool(&val);
        }

        config
    }
}

/// Overlay `upper` onto `lower`. Nested tables merge, any other value replaces.
fn merge_tables(mut lower: toml::Table, upper: toml::Table) -> toml::Table {
    for (key, value) in upper {
        let merged = match (lower.remove(&key), value) {
            (Some(toml::Value::Table(below)), toml::Value::Table(above)) => {
                toml::Value::Table(merge_tables(below, above))
            }
            (_, value) => value,
        };
        lower.insert(key, merged);
    }
    lower
}

/// Parse boolean from string (true/false/1/0/yes/no)
fn parse_bool(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

impl Config {
    /// Load config from a TOML string (for testing)
    #[cfg(test)]
    pub fn from_toml(content: &str) -> Result<Config> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
