//! Parameters for a configure or build phase, and the defaulting rules that
//! turn optional project settings into concrete values.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::builder::cmake::{DefinePolicy, Defines};
use crate::builder::errors::BuildError;
use crate::util::env::EnvironmentSpec;

/// Name of the CMake binary directory inside the build directory.
pub const BINARY_DIR_NAME: &str = "cmake";

/// Everything one phase needs to compose its invocations.
#[derive(Debug, Clone, Default)]
pub struct BuildParameters {
    /// Targets to build, in order. Empty means the tool's default target.
    pub targets: Vec<String>,

    /// `-D` definitions for the configure step.
    pub defines: Defines,

    /// Requested parallelism; 0 or 1 means "use the host's parallelism".
    pub concurrency: usize,

    /// Explicit generator name.
    pub generator: Option<String>,

    /// Path to the CMake executable; searched on PATH when unset.
    pub cmake_path: Option<PathBuf>,

    /// Extra arguments for the configure step, passed verbatim.
    pub cmake_args: Vec<String>,

    /// Extra options handed to the native build tool after `--`.
    pub build_options: Vec<String>,

    /// Variables layered over the inherited environment.
    pub env: EnvironmentSpec,

    /// Handling of defines without a value.
    pub define_policy: DefinePolicy,
}

impl BuildParameters {
    /// The target list formatted for logging.
    pub fn targets_display(&self) -> String {
        if self.targets.is_empty() {
            "<default>".to_string()
        } else {
            self.targets.join(" ")
        }
    }

    /// The defines formatted for logging, skipping empty values.
    pub fn defines_display(&self) -> String {
        self.defines
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| format!("-D{}={}", k.trim(), v.trim()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Number of parallel jobs the host can run.
pub fn host_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Concurrency handed to the build tool: the request when it is above one,
/// otherwise the host's parallelism.
pub fn resolve_concurrency(requested: usize) -> usize {
    if requested > 1 {
        requested
    } else {
        host_parallelism()
    }
}

/// Resolve the build directory: the configured one, or `<project>/target`.
pub fn build_dir(project_root: &Path, configured: Option<&Path>) -> Result<PathBuf, BuildError> {
    let dir = match configured {
        Some(dir) => project_root.join(dir),
        None => project_root.join("target"),
    };

    if dir.as_os_str().is_empty() {
        return Err(BuildError::config("build directory is not available"));
    }

    Ok(dir)
}

/// Resolve the CMake source directory: the configured one, or the project
/// root.
pub fn source_dir(project_root: &Path, configured: Option<&Path>) -> PathBuf {
    match configured {
        Some(dir) => project_root.join(dir),
        None => project_root.to_path_buf(),
    }
}

/// Resolve the CMake binary directory: the configured one, or
/// `<build-dir>/cmake`.
pub fn binary_dir(project_root: &Path, build_dir: &Path, configured: Option<&Path>) -> PathBuf {
    match configured {
        Some(dir) => project_root.join(dir),
        None => build_dir.join(BINARY_DIR_NAME),
    }
}
