//! Configuration file support for amake.
//!
//! amake reads two optional configuration files:
//! - Global: `~/.amake/config.toml` - User-wide defaults
//! - Project: `amake.toml` in the working directory
//!
//! Project config takes precedence over global config. The compilers fall
//! back to the `CC` and `CXX` environment variables when neither file sets
//! them. Command-line options are applied on top by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::BuildConfig;

/// Project configuration file name.
pub const PROJECT_CONFIG_FILE: &str = "amake.toml";

/// amake configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generated build description settings
    pub build: BuildSettings,

    /// Compiler settings
    pub toolchain: ToolchainSettings,
}

/// `[build]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Executable name (`EXEC`)
    pub exec_name: Option<String>,

    /// Object directory (`OBJDIR`)
    pub obj_dir: Option<String>,

    /// Directory scanned for sources (`SRCDIR`)
    pub src_dir: Option<String>,

    /// Extra compiler flags, placed before command-line flags
    pub flags: Vec<String>,

    /// Extra `-l`/`-L` arguments, placed before command-line libraries
    pub libs: Vec<String>,

    /// Concurrent dependency scans
    pub jobs: Option<usize>,
}

/// `[toolchain]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// C compiler driver (e.g., clang)
    pub cc: Option<String>,

    /// C++ compiler driver (e.g., clang++)
    pub cxx: Option<String>,

    /// Per-file dependency scan limit, in seconds
    pub scan_timeout: Option<u64>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing
    /// or invalid.
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
    ///
    /// Scalar settings are replaced; flag and library lists are appended.
    pub fn merge(&mut self, other: Config) {
        let Config { build, toolchain } = other;

        if build.exec_name.is_some() {
            self.build.exec_name = build.exec_name;
        }
        if build.obj_dir.is_some() {
            self.build.obj_dir = build.obj_dir;
        }
        if build.src_dir.is_some() {
            self.build.src_dir = build.src_dir;
        }
        if build.jobs.is_some() {
            self.build.jobs = build.jobs;
        }
        self.build.flags.extend(build.flags);
        self.build.libs.extend(build.libs);

        if toolchain.cc.is_some() {
            self.toolchain.cc = toolchain.cc;
        }
        if toolchain.cxx.is_some() {
            self.toolchain.cxx = toolchain.cxx;
        }
        if toolchain.scan_timeout.is_some() {
            self.toolchain.scan_timeout = toolchain.scan_timeout;
        }
    }

    /// Resolve a [`BuildConfig`] from built-in defaults, the environment
    /// and this configuration, in increasing precedence.
    ///
    /// `env` looks up an environment variable; empty values are ignored.
    pub fn resolve<F>(&self, env: F) -> BuildConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = BuildConfig::default();
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if let Some(cc) = env("CC") {
            config.c_compiler = cc;
        }
        if let Some(cxx) = env("CXX") {
            config.cxx_compiler = cxx;
        }

        if let Some(name) = &self.build.exec_name {
            config.exec_name = name.clone();
        }
        if let Some(dir) = &self.build.obj_dir {
            config.obj_dir = dir.clone();
        }
        if let Some(dir) = &self.build.src_dir {
            config.src_dir = dir.clone();
        }
        if let Some(jobs) = self.build.jobs {
            config.jobs = jobs.max(1);
        }
        config.flags.extend(self.build.flags.iter().cloned());
        config.libs.extend(self.build.libs.iter().cloned());

        if let Some(cc) = &self.toolchain.cc {
            config.c_compiler = cc.clone();
        }
        if let Some(cxx) = &self.toolchain.cxx {
            config.cxx_compiler = cxx.clone();
        }
        if let Some(secs) = self.toolchain.scan_timeout {
            config.scan_timeout = Duration::from_secs(secs);
        }

        config
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (amake.toml)
/// 2. Global config (~/.amake/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global amake config directory (~/.amake).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".amake"))
}

/// Get the global config path (~/.amake/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (amake.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG_FILE)
}
