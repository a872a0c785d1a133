//! Runtime settings with tier-based loading.
//!
//! Tiers, lowest to highest priority:
//! 1. built-in defaults
//! 2. user file (`<config dir>/devtask/settings.yaml`)
//! 3. project file (`./.task/settings.yaml`)
//! 4. environment (`TASK_DIR`, `TASK_FORMAT`, `TASK_NO_GIT`)
//! 5. command-line flags, applied by the caller
//!
//! `TASK_SETTINGS_PATH` names a single file that replaces tiers 2 and 3.

use crate::format::OutputFormat;
use crate::storage::DEFAULT_STORAGE_DIR;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const SETTINGS_FILE: &str = "settings.yaml";
const APP_DIR: &str = "devtask";

pub const ENV_SETTINGS_PATH: &str = "TASK_SETTINGS_PATH";
pub const ENV_DIR: &str = "TASK_DIR";
pub const ENV_FORMAT: &str = "TASK_FORMAT";
pub const ENV_NO_GIT: &str = "TASK_NO_GIT";

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory holding `tasks.json`, `config.json` and `backup/`.
    pub storage_dir: PathBuf,
    pub format: OutputFormat,
    /// Never touch git, even inside a work tree.
    pub no_git: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            format: OutputFormat::default(),
            no_git: false,
        }
    }
}

/// One settings file. Every key is optional; absent keys leave the lower
/// tier's value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct SettingsFile {
    pub storage_dir: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub no_git: Option<bool>,
}

impl SettingsFile {
    pub fn parse(content: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        // An empty document is null, not an empty mapping
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_value(value)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("failed to parse settings file {}", path.display()))
    }
}

/// Where each file tier is looked up.
#[derive(Debug, Clone, Default)]
pub struct SettingsPaths {
    pub user_file: Option<PathBuf>,
    pub project_file: Option<PathBuf>,
    /// Replaces both file tiers when set.
    pub explicit_file: Option<PathBuf>,
}

impl SettingsPaths {
    /// Standard locations, honouring `TASK_SETTINGS_PATH`.
    pub fn discover() -> Self {
        Self {
            user_file: dirs::config_dir().map(|d| d.join(APP_DIR).join(SETTINGS_FILE)),
            project_file: Some(Path::new(DEFAULT_STORAGE_DIR).join(SETTINGS_FILE)),
            explicit_file: std::env::var_os(ENV_SETTINGS_PATH).map(PathBuf::from),
        }
    }

    pub fn with_files(user_file: Option<PathBuf>, project_file: Option<PathBuf>) -> Self {
        Self {
            user_file,
            project_file,
            explicit_file: None,
        }
    }
}

impl Settings {
    /// Defaults, files at the standard locations, then the process environment.
    pub fn load() -> Result<Self> {
        let mut settings = Self::load_with_paths(&SettingsPaths::discover())?;
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Defaults overlaid with the file tiers in `paths`.
    ///
    /// A missing or broken user/project file is skipped with a warning; an
    /// explicit file must load.
    pub fn load_with_paths(paths: &SettingsPaths) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(ref explicit) = paths.explicit_file {
            settings.overlay(SettingsFile::load(explicit)?);
            debug!(path = %explicit.display(), "Loaded explicit settings file");
            return Ok(settings);
        }

        for path in [&paths.user_file, &paths.project_file].into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            match SettingsFile::load(path) {
                Ok(file) => {
                    settings.overlay(file);
                    debug!(path = %path.display(), "Loaded settings file");
                }
                Err(e) => {
                    let reason = format!("{:#}", e);
                    warn!(path = %path.display(), error = %reason, "Skipping settings file");
                }
            }
        }

        Ok(settings)
    }

    /// Replace every field the file sets.
    pub fn overlay(&mut self, file: SettingsFile) {
        if let Some(dir) = file.storage_dir {
            self.storage_dir = dir;
        }
        if let Some(format) = file.format {
            self.format = format;
        }
        if let Some(no_git) = file.no_git {
            self.no_git = no_git;
        }
    }

    /// Apply environment overrides read through `lookup`. Unparseable values
    /// are warned about and ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DIR).filter(|d| !d.is_empty()) {
            self.storage_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup(ENV_FORMAT) {
            match raw.parse() {
                Ok(format) => self.format = format,
                Err(e) => warn!(var = ENV_FORMAT, error = %e, "Ignoring invalid value"),
            }
        }

        if let Some(raw) = lookup(ENV_NO_GIT) {
            match parse_flag(&raw) {
                Some(flag) => self.no_git = flag,
                None => warn!(var = ENV_NO_GIT, value = %raw, "Ignoring invalid value"),
            }
        }
    }

    /// Apply command-line overrides. `no_git` can only switch git off.
    pub fn apply_cli(&mut self, dir: Option<PathBuf>, format: Option<OutputFormat>, no_git: bool) {
        if let Some(dir) = dir {
            self.storage_dir = dir;
        }
        if let Some(format) = format {
            self.format = format;
        }
        self.no_git |= no_git;
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
