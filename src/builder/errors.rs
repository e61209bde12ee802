//! Error types for the configure and build phases.

use std::io;

use thiserror::Error;

/// Error raised while composing, launching, or classifying a CMake invocation.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A parameter is missing or unusable.
    #[error("{message}")]
    Configuration { message: String },

    /// The host refused an environment variable for the child process.
    #[error("failed to update environment due to a restriction of the operating system: `{name}` {reason}")]
    Environment { name: String, reason: String },

    /// The executable could not be started.
    #[error("failed to spawn `{program}`")]
    ProcessSpawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The caller raised the interrupt while the child was running.
    #[error("`{program}` command was interrupted")]
    ProcessInterrupted { program: String },

    /// Reading output from, or waiting on, a running child failed.
    #[error("I/O error while running `{program}`")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The child exited with a non-zero status.
    #[error("{tool} command failed with exit status of {status}{}", target_suffix(.target))]
    BuildFailure {
        tool: String,
        status: i32,
        target: Option<String>,
    },
}

fn target_suffix(target: &Option<String>) -> String {
    match target {
        Some(t) => format!(" (target `{}`)", t),
        None => String::new(),
    }
}

impl BuildError {
    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        BuildError::Configuration {
            message: message.into(),
        }
    }

    /// The failing target, when the error is a build failure of a named target.
    pub fn failed_target(&self) -> Option<&str> {
        match self {
            BuildError::BuildFailure { target, .. } => target.as_deref(),
            _ => None,
        }
    }
}
