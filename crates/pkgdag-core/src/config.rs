//! Project and user settings.
//!
//! `pkgdag.toml` in the working directory carries project settings; the
//! per-user file `<config_dir>/pkgdag/config.toml` only picks an output
//! mode. Both are optional.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::source::DEFAULT_SUFFIX;
use crate::target::DEFAULT_ARCH;

/// File name of the project settings file.
pub const PROJECT_FILE: &str = "pkgdag.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub graph: GraphSettings,
    #[serde(default)]
    pub target: TargetSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSettings {
    /// Directory holding one package document per file.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_suffix")]
    pub suffix: String,
    /// Root of the pipeline catalog, if any.
    #[serde(default)]
    pub pipeline_dir: Option<PathBuf>,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            suffix: default_suffix(),
            pipeline_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSettings {
    #[serde(default = "default_arch")]
    pub arch: String,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            arch: default_arch(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    /// `pretty`, `text` or `json`.
    #[serde(default)]
    pub output: Option<String>,
}

/// Load `pkgdag.toml` from `project_root`, or defaults if it is absent.
///
/// Relative `dir` and `pipeline_dir` values are resolved against
/// `project_root`.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(PROJECT_FILE);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut config = toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    if config.graph.dir.is_relative() {
        config.graph.dir = project_root.join(&config.graph.dir);
    }
    if let Some(dir) = config.graph.pipeline_dir.as_mut().filter(|d| d.is_relative()) {
        *dir = project_root.join(&*dir);
    }
    Ok(config)
}

/// Load the per-user settings file, or defaults if there is none.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };
    load_user_config_from(&config_dir.join("pkgdag/config.toml"))
}

/// Load user settings from an explicit path.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn load_user_config_from(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_suffix() -> String {
    DEFAULT_SUFFIX.to_string()
}

fn default_arch() -> String {
    DEFAULT_ARCH.to_string()
}
