//! Configuration file support.
//!
//! Parameters come from two files:
//! - Global: `<config dir>/cmake-driver/config.toml` - user-wide defaults
//! - Project: `cmake-driver.toml` in the project root
//!
//! Project config takes precedence over global config; command-line flags
//! take precedence over both.
//!
//! ```toml
//! [project]
//! build-directory = "target"
//!
//! [cmake]
//! generator = "Ninja"
//! define-policy = "reject"
//!
//! [cmake.defines]
//! CMAKE_BUILD_TYPE = "Release"
//!
//! [build]
//! concurrency = 8
//! targets = ["mylib", "myapp"]
//! test-targets = ["mylib_test"]
//!
//! [env]
//! PATH = "/opt/toolchain/bin:%PATH%"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::cmake::{DefinePolicy, Defines};
use crate::builder::params::BuildParameters;
use crate::util::env::EnvironmentSpec;
use crate::util::fs::CleanOptions;

/// Name of the project configuration file.
pub const PROJECT_CONFIG_FILE: &str = "cmake-driver.toml";

/// Driver configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory layout
    pub project: ProjectConfig,

    /// Configure step settings
    pub cmake: CMakeConfig,

    /// Build step settings
    pub build: BuildConfig,

    /// Variables for every CMake invocation; values may use `%NAME%`
    pub env: EnvironmentSpec,

    /// Clean step settings
    pub clean: CleanConfig,
}

/// Directory layout, relative to the project root unless absolute.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProjectConfig {
    /// Build output root (default: `target`)
    pub build_directory: Option<PathBuf>,

    /// Directory holding the top-level CMakeLists.txt (default: project root)
    pub source_directory: Option<PathBuf>,

    /// CMake binary directory (default: `<build-directory>/cmake`)
    pub binary_directory: Option<PathBuf>,
}

/// Configure step settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CMakeConfig {
    /// Path to the cmake executable (default: search PATH)
    pub path: Option<PathBuf>,

    /// Generator name (default: CMake's own default, `NMake Makefiles` on Windows)
    pub generator: Option<String>,

    /// `-D` definitions
    pub defines: Defines,

    /// Extra configure arguments
    pub args: Vec<String>,

    /// What to do with a define without a value
    pub define_policy: Option<DefinePolicy>,
}

/// Build step settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Parallel jobs (None, 0 or 1 = number of CPUs)
    pub concurrency: Option<usize>,

    /// Targets for the compile phase (empty = default target)
    pub targets: Vec<String>,

    /// Targets for the test-compile phase (empty = nothing to do)
    pub test_targets: Vec<String>,

    /// Options for the native build tool, passed after `--`
    pub options: Vec<String>,
}

/// Clean step settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CleanConfig {
    /// Skip the clean step entirely
    pub skip: Option<bool>,

    /// Descend into symlinked directories
    pub follow_symlinks: Option<bool>,

    /// Abort on the first deletion failure (default: true)
    pub fail_on_error: Option<bool>,

    /// Retry a failed deletion once (default: true)
    pub retry_on_error: Option<bool>,

    /// Glob patterns, relative to the binary directory, of paths to keep
    pub exclude: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Merge another config into this one (other takes precedence).
    ///
    /// Scalars are replaced when set, lists are replaced when non-empty, and
    /// tables are merged key by key.
    pub fn merge(&mut self, other: Config) {
        // Project settings
        if other.project.build_directory.is_some() {
            self.project.build_directory = other.project.build_directory;
        }
        if other.project.source_directory.is_some() {
            self.project.source_directory = other.project.source_directory;
        }
        if other.project.binary_directory.is_some() {
            self.project.binary_directory = other.project.binary_directory;
        }

        // CMake settings
        if other.cmake.path.is_some() {
            self.cmake.path = other.cmake.path;
        }
        if other.cmake.generator.is_some() {
            self.cmake.generator = other.cmake.generator;
        }
        self.cmake.defines.extend(other.cmake.defines);
        if !other.cmake.args.is_empty() {
            self.cmake.args = other.cmake.args;
        }
        if other.cmake.define_policy.is_some() {
            self.cmake.define_policy = other.cmake.define_policy;
        }

        // Build settings
        if other.build.concurrency.is_some() {
            self.build.concurrency = other.build.concurrency;
        }
        if !other.build.targets.is_empty() {
            self.build.targets = other.build.targets;
        }
        if !other.build.test_targets.is_empty() {
            self.build.test_targets = other.build.test_targets;
        }
        if !other.build.options.is_empty() {
            self.build.options = other.build.options;
        }

        self.env.extend(other.env);

        // Clean settings
        if other.clean.skip.is_some() {
            self.clean.skip = other.clean.skip;
        }
        if other.clean.follow_symlinks.is_some() {
            self.clean.follow_symlinks = other.clean.follow_symlinks;
        }
        if other.clean.fail_on_error.is_some() {
            self.clean.fail_on_error = other.clean.fail_on_error;
        }
        if other.clean.retry_on_error.is_some() {
            self.clean.retry_on_error = other.clean.retry_on_error;
        }
        if !other.clean.exclude.is_empty() {
            self.clean.exclude = other.clean.exclude;
        }
    }

    /// Parameters for a build phase over `targets`.
    pub fn parameters(&self, targets: &[String]) -> BuildParameters {
        BuildParameters {
            targets: targets.to_vec(),
            defines: self.cmake.defines.clone(),
            concurrency: self.build.concurrency.unwrap_or(0),
            generator: self.cmake.generator.clone(),
            cmake_path: self.cmake.path.clone(),
            cmake_args: self.cmake.args.clone(),
            build_options: self.build.options.clone(),
            env: self.env.clone(),
            define_policy: self.cmake.define_policy.unwrap_or_default(),
        }
    }

    /// Options for the clean step.
    pub fn clean_options(&self) -> CleanOptions {
        CleanOptions {
            follow_symlinks: self.clean.follow_symlinks.unwrap_or(false),
            fail_on_error: self.clean.fail_on_error.unwrap_or(true),
            retry_on_error: self.clean.retry_on_error.unwrap_or(true),
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (cmake-driver.toml)
/// 2. Global config
/// 3. Defaults
///
/// A file that exists but cannot be parsed is an error; a missing file is not.
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load(global_path)?);
        }
    }

    if project_path.exists() {
        config.merge(Config::load(project_path)?);
    }

    Ok(config)
}

/// Get the global config path.
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "cmake-driver")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
