//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/curtree/curtree.toml`
//! 3. Local config: `<project_dir>/.curtree.toml`
//! 4. Environment variables: `CURTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// What to do when no curriculum document exists yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SeedConfig {
    /// Write the built-in curriculum (true) or start from an empty tree
    pub enabled: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Raw seed config for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSeedConfig {
    pub enabled: Option<bool>,
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_dir: Option<PathBuf>,
    pub curriculum_file: Option<String>,
    pub selection_file: Option<String>,
    pub confirm_delete: Option<bool>,
    pub pretty: Option<bool>,
    pub seed: RawSeedConfig,
}

/// Unified configuration for curtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the curriculum and selection documents
    pub data_dir: PathBuf,
    /// Curriculum document file name (relative to data_dir)
    pub curriculum_file: String,
    /// Selection document file name (relative to data_dir)
    pub selection_file: String,
    /// Ask before deleting a node and its subtree
    pub confirm_delete: bool,
    /// Pretty-print the curriculum document
    pub pretty: bool,
    /// First-run behaviour
    pub seed: SeedConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            curriculum_file: "curriculum.json".into(),
            selection_file: "selection.json".into(),
            confirm_delete: true,
            pretty: true,
            seed: SeedConfig::default(),
        }
    }
}

/// Default data directory: XDG data dir, falling back to ~/.curtree.
fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "curtree")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.curtree"))
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Get the XDG config directory for curtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "curtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("curtree.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".curtree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Full path of the curriculum document.
    pub fn curriculum_path(&self) -> PathBuf {
        self.data_dir.join(&self.curriculum_file)
    }

    /// Full path of the selection document.
    pub fn selection_path(&self) -> PathBuf {
        self.data_dir.join(&self.selection_file)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.data_dir.to_string_lossy().as_ref());
        self.data_dir = PathBuf::from(expanded);
    }

    /// Merge overlay config onto self (base): overlay wins where specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_dir: overlay
                .data_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.clone()),
            curriculum_file: overlay
                .curriculum_file
                .clone()
                .unwrap_or_else(|| self.curriculum_file.clone()),
            selection_file: overlay
                .selection_file
                .clone()
                .unwrap_or_else(|| self.selection_file.clone()),
            confirm_delete: overlay.confirm_delete.unwrap_or(self.confirm_delete),
            pretty: overlay.pretty.unwrap_or(self.pretty),
            seed: SeedConfig {
                enabled: overlay.seed.enabled.unwrap_or(self.seed.enabled),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional directory holding a local `.curtree.toml`
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/curtree/curtree.toml`
    /// 3. Local config: `<project_dir>/.curtree.toml`
    /// 4. Environment variables: `CURTREE_*` prefix
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply CURTREE_* environment variables as explicit overrides.
    ///
    /// Nested keys use `__`: `CURTREE_SEED__ENABLED=false`.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("CURTREE")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("data_dir") {
            settings.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("curriculum_file") {
            settings.curriculum_file = val;
        }
        if let Ok(val) = config.get_string("selection_file") {
            settings.selection_file = val;
        }
        if let Ok(val) = config.get_bool("confirm_delete") {
            settings.confirm_delete = val;
        }
        if let Ok(val) = config.get_bool("pretty") {
            settings.pretty = val;
        }
        if let Ok(val) = config.get_bool("seed.enabled") {
            settings.seed.enabled = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# curtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/curtree/curtree.toml
#   Local:  <project_dir>/.curtree.toml
#   Env:    CURTREE_* environment variables (CURTREE_SEED__ENABLED for [seed] enabled)

# Directory holding curriculum.json and selection.json
# data_dir = "~/.local/share/curtree"

# File names inside data_dir
# curriculum_file = "curriculum.json"
# selection_file = "selection.json"

# Ask before deleting a node and everything below it
# confirm_delete = true

# Pretty-print the curriculum document
# pretty = true

[seed]
# Write the built-in curriculum when no document exists (false: start empty)
# enabled = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
