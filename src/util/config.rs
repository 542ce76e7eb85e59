//! Configuration file support.
//!
//! Two locations are read:
//! - Global: `~/.rmlui-recipe/config.toml` - user-wide defaults
//! - Project: `recipe.toml` in the working directory
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.
//!
//! ```toml
//! [options]
//! shared = true
//! font_engine = "none"
//!
//! [settings]
//! build_type = "Debug"
//! "compiler.cppstd" = "17"
//!
//! [source]
//! sha256 = "..."
//! require_checksum = true
//!
//! [build]
//! jobs = 8
//! deps = "deps.toml"
//!
//! [build.variables]
//! RMLUI_SVG_PLUGIN = true
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};

/// Project config file name.
pub const PROJECT_CONFIG_NAME: &str = "recipe.toml";

/// Recipe configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Option values, by option name
    pub options: BTreeMap<String, ConfigValue>,

    /// Setting values, by setting name
    pub settings: BTreeMap<String, String>,

    /// Source acquisition settings
    pub source: SourceConfig,

    /// Build settings
    pub build: BuildConfig,
}

/// An option value as written in TOML: either a boolean or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Str(String),
}

impl ConfigValue {
    /// Textual form accepted by the option parser.
    pub fn to_option_text(&self) -> String {
        match self {
            ConfigValue::Bool(true) => "True".to_string(),
            ConfigValue::Bool(false) => "False".to_string(),
            ConfigValue::Str(s) => s.clone(),
        }
    }
}

/// Source acquisition configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Override the release archive URL (mirrors)
    pub url: Option<String>,

    /// Expected SHA256 of the release archive
    pub sha256: Option<String>,

    /// Fail when no checksum is configured
    pub require_checksum: bool,

    /// Never touch the network; only cached or local archives are used
    pub offline: bool,

    /// Directory for downloaded archives
    pub cache_dir: Option<PathBuf>,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Parallel jobs passed to `cmake --build` (None = CMake decides)
    pub jobs: Option<usize>,

    /// CMake generator (e.g., "Ninja")
    pub generator: Option<String>,

    /// Dependency info file handed to `generate`
    pub deps: Option<PathBuf>,

    /// Extra CMake cache variables, by name
    pub variables: BTreeMap<String, ConfigValue>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration, or defaults if the file doesn't exist.
    ///
    /// A file that exists but fails to parse is an error: it may carry
    /// options or `require_checksum`, which must never be dropped silently.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        self.options.extend(other.options);
        self.settings.extend(other.settings);

        if other.source.url.is_some() {
            self.source.url = other.source.url;
        }
        if other.source.sha256.is_some() {
            self.source.sha256 = other.source.sha256;
        }
        if other.source.require_checksum {
            self.source.require_checksum = true;
        }
        if other.source.offline {
            self.source.offline = true;
        }
        if other.source.cache_dir.is_some() {
            self.source.cache_dir = other.source.cache_dir;
        }

        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.generator.is_some() {
            self.build.generator = other.build.generator;
        }
        if other.build.deps.is_some() {
            self.build.deps = other.build.deps;
        }
        self.build.variables.extend(other.build.variables);
    }

    /// Options as `name=value` assignments, sorted by name.
    pub fn option_assignments(&self) -> Vec<String> {
        self.options
            .iter()
            .map(|(name, value)| format!("{}={}", name, value.to_option_text()))
            .collect()
    }

    /// Settings as `name=value` assignments, sorted by name.
    pub fn setting_assignments(&self) -> Vec<String> {
        self.settings
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect()
    }

    /// Directory for downloaded archives.
    pub fn cache_dir(&self) -> PathBuf {
        self.source
            .cache_dir
            .clone()
            .unwrap_or_else(default_cache_dir)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (recipe.toml)
/// 2. Global config (~/.rmlui-recipe/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path)?);
    }
    config.merge(Config::load_or_default(project_path)?);

    Ok(config)
}

/// Get the global config directory (~/.rmlui-recipe).
pub fn global_config_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|b| b.home_dir().join(".rmlui-recipe"))
}

/// Get the global config path (~/.rmlui-recipe/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (recipe.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG_NAME)
}

/// Default download cache directory.
pub fn default_cache_dir() -> PathBuf {
    ProjectDirs::from("", "", "rmlui-recipe")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("rmlui-recipe-cache"))
}
