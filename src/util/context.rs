//! Global context for driver operations.
//!
//! Locates the project root and the configuration files, and loads the
//! merged configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{global_config_path, load_config, Config, PROJECT_CONFIG_FILE};

/// Global context containing paths and configuration sources.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Directory the project root search starts from
    cwd: PathBuf,

    /// Global configuration file, if the platform has a config directory
    global_config: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a new GlobalContext rooted at the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        Ok(GlobalContext {
            cwd,
            global_config: global_config_path(),
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Use `path` as the global configuration file, or none at all.
    pub fn with_global_config(mut self, path: Option<PathBuf>) -> Self {
        self.global_config = path;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path.
    pub fn global_config(&self) -> Option<&Path> {
        self.global_config.as_deref()
    }

    /// Find the project root: the nearest directory, starting at cwd and
    /// searching upward, that holds a project config file. Falls back to cwd.
    pub fn project_root(&self) -> PathBuf {
        self.cwd
            .ancestors()
            .find(|dir| dir.join(PROJECT_CONFIG_FILE).is_file())
            .unwrap_or(&self.cwd)
            .to_path_buf()
    }

    /// Get the project configuration file path.
    pub fn project_config(&self) -> PathBuf {
        self.project_root().join(PROJECT_CONFIG_FILE)
    }

    /// Load the merged global and project configuration.
    pub fn load_config(&self) -> Result<Config> {
        load_config(self.global_config(), &self.project_config())
    }
}
