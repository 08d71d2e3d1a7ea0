//! Configuration file support for cmbuild.
//!
//! cmbuild reads two configuration file locations:
//! - Global: `~/.cmbuild/config.toml` - User-wide defaults
//! - Project: `<source>/.cmbuild/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// cmbuild configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Container delegation settings
    pub docker: DockerConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Build driver ("Visual Studio", "make", "ninja", "nmake")
    pub build_tool: Option<String>,

    /// Build type used when no build-type flag is given
    pub build_type: Option<String>,

    /// Visual Studio version token
    pub msvc_version: Option<String>,

    /// Build directory, relative to the source directory
    pub build_dir: Option<PathBuf>,

    pub clean_before: Option<bool>,

    pub clean_after: Option<bool>,

    /// Build incrementally instead of rebuilding
    pub incremental: Option<bool>,
}

/// Container delegation configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    /// Image used when `--docker` is given without `--docker-image`
    pub image: Option<String>,

    /// Mount point of the source directory inside the container
    pub mount: Option<String>,

    /// Program invoked inside the container
    pub program: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        let b = other.build;
        if b.build_tool.is_some() {
            self.build.build_tool = b.build_tool;
        }
        if b.build_type.is_some() {
            self.build.build_type = b.build_type;
        }
        if b.msvc_version.is_some() {
            self.build.msvc_version = b.msvc_version;
        }
        if b.build_dir.is_some() {
            self.build.build_dir = b.build_dir;
        }
        if b.clean_before.is_some() {
            self.build.clean_before = b.clean_before;
        }
        if b.clean_after.is_some() {
            self.build.clean_after = b.clean_after;
        }
        if b.incremental.is_some() {
            self.build.incremental = b.incremental;
        }

        let d = other.docker;
        if d.image.is_some() {
            self.docker.image = d.image;
        }
        if d.mount.is_some() {
            self.docker.mount = d.mount;
        }
        if d.program.is_some() {
            self.docker.program = d.program;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (<source>/.cmbuild/config.toml)
/// 2. Global config (~/.cmbuild/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global) = global_path {
        config.merge(Config::load_or_default(global));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global cmbuild config directory (~/.cmbuild).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".cmbuild"))
}

/// Get the global config path (~/.cmbuild/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (<source>/.cmbuild/config.toml).
pub fn project_config_path(source_dir: &Path) -> PathBuf {
    source_dir.join(".cmbuild").join("config.toml")
}
