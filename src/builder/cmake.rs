//! CMake command-line composition.
//!
//! These functions only build argument lists; they never touch the process
//! environment or the host platform. The platform is passed in explicitly so
//! the Windows generator default can be exercised from any host.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::builder::errors::BuildError;
use crate::util::process::find_cmake;

/// Generator used on Windows hosts when none is configured.
pub const WINDOWS_DEFAULT_GENERATOR: &str = "NMake Makefiles";

/// `-D` definitions passed to the configure step, in declaration order.
pub type Defines = IndexMap<String, String>;

/// Host platform family, as far as command composition cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Windows,
    Unix,
}

impl HostPlatform {
    /// The platform this binary was compiled for.
    pub const fn current() -> Self {
        if cfg!(windows) {
            HostPlatform::Windows
        } else {
            HostPlatform::Unix
        }
    }

    /// Generator to select when the project does not name one.
    pub fn default_generator(&self) -> Option<&'static str> {
        match self {
            HostPlatform::Windows => Some(WINDOWS_DEFAULT_GENERATOR),
            HostPlatform::Unix => None,
        }
    }
}

/// What to do with a define that has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinePolicy {
    /// Leave the define off the command line and log a warning.
    #[default]
    Skip,
    /// Fail the configure step.
    Reject,
}

impl FromStr for DefinePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(DefinePolicy::Skip),
            "reject" => Ok(DefinePolicy::Reject),
            _ => Err(format!(
                "invalid define policy '{}'; expected 'skip' or 'reject'",
                s
            )),
        }
    }
}

/// Build the `-D<key>=<value>` tokens for `defines`.
pub fn define_args(defines: &Defines, policy: DefinePolicy) -> Result<Vec<String>, BuildError> {
    let mut args = Vec::with_capacity(defines.len());

    for (key, value) in defines {
        let key = key.trim();
        let value = value.trim();

        if key.is_empty() {
            return Err(BuildError::config(
                "supplied CMake command line definition has an empty key",
            ));
        }

        if value.is_empty() {
            match policy {
                DefinePolicy::Skip => {
                    tracing::warn!("skipping CMake definition `{}`: no value supplied", key);
                    continue;
                }
                DefinePolicy::Reject => {
                    return Err(BuildError::config(format!(
                        "supplied CMake command line definition with key '{}' has no value supplied with it",
                        key
                    )));
                }
            }
        }

        args.push(format!("-D{}={}", key, value));
    }

    Ok(args)
}

/// Arguments for the configure step (without the executable).
///
/// Layout: defines, optional `-G<generator>`, `extra_args` verbatim, then the
/// absolute source directory.
pub fn configure_command(
    source_dir: &Path,
    defines: &Defines,
    generator: Option<&str>,
    platform: HostPlatform,
    extra_args: &[String],
    policy: DefinePolicy,
) -> Result<Vec<String>, BuildError> {
    let mut args = define_args(defines, policy)?;

    let generator = generator
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .or_else(|| platform.default_generator());

    if let Some(generator) = generator {
        args.push(format!("-G{}", generator));
    }

    args.extend(extra_args.iter().cloned());
    args.push(absolute(source_dir)?.display().to_string());

    Ok(args)
}

/// Arguments for one `cmake --build` invocation (without the executable).
///
/// `concurrency` must already be resolved; values of one or less add no
/// `--parallel` flag.
pub fn target_command(concurrency: usize, target: Option<&str>, build_options: &[String]) -> Vec<String> {
    let mut args = vec!["--build".to_string(), ".".to_string()];

    if concurrency > 1 {
        args.push("--parallel".to_string());
        args.push(concurrency.to_string());
    }

    if let Some(target) = target {
        args.push("--target".to_string());
        args.push(target.to_string());
    }

    if !build_options.is_empty() {
        args.push("--".to_string());
        args.extend(build_options.iter().cloned());
    }

    args
}

/// Pick the CMake executable: the override when non-empty, else whatever
/// `cmake` resolves to on PATH, else the bare name.
pub fn cmake_program(path_override: Option<&Path>) -> PathBuf {
    match path_override {
        Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
        _ => find_cmake().unwrap_or_else(|| PathBuf::from("cmake")),
    }
}

/// Check if a directory contains a CMake project.
pub fn is_cmake_project(dir: &Path) -> bool {
    dir.join("CMakeLists.txt").exists()
}

fn absolute(path: &Path) -> Result<PathBuf, BuildError> {
    std::path::absolute(path).map_err(|e| {
        BuildError::config(format!(
            "cannot make source directory `{}` absolute: {}",
            path.display(),
            e
        ))
    })
}
