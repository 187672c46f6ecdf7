//! Configuration loader with tier-based merging.
//!
//! Files are merged field by field, so a project file can override a single
//! key of the user file without restating the rest.

use super::types::{Config, StoreBackend};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Project-level config file, relative to the working directory.
pub const PROJECT_CONFIG_FILE: &str = "task-board.yaml";

/// Where each file tier lives.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// `~/.task-board/config.yaml`
    pub user_file: Option<PathBuf>,
    /// `./task-board.yaml`
    pub project_file: Option<PathBuf>,
    /// `--config` or `TASK_BOARD_CONFIG_PATH`
    pub explicit_file: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover configuration paths from the environment and defaults.
    pub fn discover(explicit: Option<PathBuf>) -> Self {
        let explicit_file = explicit.or_else(|| {
            std::env::var("TASK_BOARD_CONFIG_PATH")
                .ok()
                .map(PathBuf::from)
        });

        Self {
            user_file: dirs::home_dir().map(|h| h.join(".task-board").join("config.yaml")),
            project_file: Some(PathBuf::from(PROJECT_CONFIG_FILE)),
            explicit_file,
        }
    }
}

/// Deep merge two values, with `overlay` taking precedence. Objects merge
/// recursively; anything else is replaced. A null overlay keeps the base.
fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

fn read_yaml(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config {}", path.display()))
}

/// Loads and merges the configuration tiers.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: Config,
    /// Files that contributed, lowest tier first.
    sources: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Load from discovered paths and the process environment.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self> {
        Self::load_with(ConfigPaths::discover(explicit), |key| std::env::var(key).ok())
    }

    /// Load from explicit paths, reading environment overrides through `env`.
    ///
    /// Missing user and project files are skipped, and so are unreadable
    /// ones (with a warning). A missing or invalid explicit file is an error.
    pub fn load_with(paths: ConfigPaths, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut merged = serde_json::to_value(Config::default())?;
        let mut sources = Vec::new();

        for path in [&paths.user_file, &paths.project_file].into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            match read_yaml(path) {
                Ok(value) => {
                    merged = deep_merge(merged, value);
                    sources.push(path.clone());
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Ignoring config file"),
            }
        }

        if let Some(ref path) = paths.explicit_file {
            merged = deep_merge(merged, read_yaml(path)?);
            sources.push(path.clone());
        }

        let mut config: Config =
            serde_json::from_value(merged).context("Invalid configuration")?;
        Self::apply_env_overrides(&mut config, env)?;

        debug!(?sources, "Loaded configuration");

        Ok(Self {
            paths,
            config,
            sources,
        })
    }

    /// Apply environment variable overrides to config.
    fn apply_env_overrides(
        config: &mut Config,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<()> {
        if let Some(url) = env("TASK_BOARD_STORE_URL") {
            config.store.url = Some(url);
        }

        if let Some(key) = env("TASK_BOARD_STORE_KEY") {
            config.store.key = Some(key);
        }

        if let Some(backend) = env("TASK_BOARD_STORE_BACKEND") {
            config.store.backend = backend
                .parse::<StoreBackend>()
                .map_err(anyhow::Error::msg)
                .context("TASK_BOARD_STORE_BACKEND")?;
        }

        if let Some(db_path) = env("TASK_BOARD_DB_PATH") {
            config.store.db_path = PathBuf::from(db_path);
        }

        if let Some(port) = env("TASK_BOARD_PORT") {
            config.ui.port = port
                .parse()
                .with_context(|| format!("TASK_BOARD_PORT is not a port number: {}", port))?;
        }

        Ok(())
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Config files that were applied, lowest precedence first.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}
