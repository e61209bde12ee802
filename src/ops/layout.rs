//! Per-invocation settings shared by every phase.
//!
//! Command-line overrides are folded into the loaded configuration, and the
//! project directories are resolved against the project root.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::cmake::DefinePolicy;
use crate::builder::errors::BuildError;
use crate::builder::params;
use crate::util::config::Config;
use crate::util::GlobalContext;

/// Command-line overrides for a phase. Anything left unset falls back to
/// the configuration files.
#[derive(Debug, Clone, Default)]
pub struct PhaseOptions {
    /// Path to the cmake executable
    pub cmake_path: Option<PathBuf>,

    /// Generator name
    pub generator: Option<String>,

    /// `-D` definitions, added to (or replacing) configured ones
    pub defines: Vec<(String, String)>,

    /// Environment variables, added to (or replacing) configured ones
    pub env: Vec<(String, String)>,

    /// Parallel jobs
    pub jobs: Option<usize>,

    /// Targets to build, replacing the configured list of the phase
    pub targets: Vec<String>,

    /// CMake source directory
    pub source_dir: Option<PathBuf>,

    /// CMake binary directory
    pub binary_dir: Option<PathBuf>,

    /// Handling of defines without a value
    pub define_policy: Option<DefinePolicy>,

    /// Skip the clean step
    pub skip: bool,
}

impl PhaseOptions {
    /// The overrides as a configuration layer.
    pub fn as_config(&self) -> Config {
        let mut config = Config::default();

        config.project.source_directory = self.source_dir.clone();
        config.project.binary_directory = self.binary_dir.clone();

        config.cmake.path = self.cmake_path.clone();
        config.cmake.generator = self.generator.clone();
        config.cmake.defines.extend(self.defines.iter().cloned());
        config.cmake.define_policy = self.define_policy;

        config.build.concurrency = self.jobs;

        config.env.extend(self.env.iter().cloned());

        if self.skip {
            config.clean.skip = Some(true);
        }

        config
    }

    /// Load the configuration for `ctx` with these overrides applied, and
    /// resolve the project layout.
    ///
    /// Directories given on the command line are relative to the working
    /// directory; directories in configuration files are relative to the
    /// project root.
    pub fn load(&self, ctx: &GlobalContext) -> Result<(Config, ProjectLayout)> {
        let mut overrides = self.as_config();
        let project = &mut overrides.project;
        project.source_directory = project.source_directory.take().map(|d| ctx.cwd().join(d));
        project.binary_directory = project.binary_directory.take().map(|d| ctx.cwd().join(d));

        let mut config = ctx.load_config()?;
        config.merge(overrides);

        let layout = ProjectLayout::resolve(&ctx.project_root(), &config)?;
        Ok((config, layout))
    }

    /// The targets for a phase whose configured list is `configured`.
    pub fn targets_or(&self, configured: &[String]) -> Vec<String> {
        if self.targets.is_empty() {
            configured.to_vec()
        } else {
            self.targets.clone()
        }
    }
}

/// Resolved project directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub build_dir: PathBuf,
    pub source_dir: PathBuf,
    pub binary_dir: PathBuf,
}

impl ProjectLayout {
    /// Resolve the directories configured in `config` against `root`.
    pub fn resolve(root: &Path, config: &Config) -> Result<Self, BuildError> {
        let project = &config.project;
        let build_dir = params::build_dir(root, project.build_directory.as_deref())?;
        let source_dir = params::source_dir(root, project.source_directory.as_deref());
        let binary_dir = params::binary_dir(root, &build_dir, project.binary_directory.as_deref());

        Ok(ProjectLayout {
            root: root.to_path_buf(),
            build_dir,
            source_dir,
            binary_dir,
        })
    }
}
