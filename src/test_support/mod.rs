//! Test utilities and mocks for unit tests.
//!
//! The main piece is [`MockExecutor`], an [`Executor`] that records every
//! invocation instead of spawning it and replays scripted outcomes.
//!
//! # Example
//!
//! ```rust,ignore
//! use cmake_driver::test_support::MockExecutor;
//!
//! #[test]
//! fn test_example() {
//!     let mut exec = MockExecutor::new();
//!     exec.fail_target("tests", 2);
//!
//!     // Hand `exec` to a BuildCoordinator, then inspect `exec.calls()`.
//! }
//! ```

pub mod fixtures;

use std::io;
use std::path::PathBuf;

use indexmap::IndexMap;

use crate::builder::coordinator::Executor;
use crate::builder::errors::BuildError;
use crate::util::process::{InvocationResult, ProcessBuilder};

// Re-export fixtures for convenience
pub use fixtures::*;

/// An invocation as seen by [`MockExecutor`].
#[derive(Debug, Clone)]
pub struct MockInvocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: IndexMap<String, String>,
}

impl MockInvocation {
    /// The value following `--target`, if any.
    pub fn target(&self) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == "--target")
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone)]
enum Outcome {
    Exit(i32),
    SpawnError,
}

/// Recording executor for coordinator tests.
///
/// Every invocation succeeds with the configured output lines unless a
/// failure was scripted for its target.
#[derive(Debug, Default)]
pub struct MockExecutor {
    calls: Vec<MockInvocation>,
    by_target: Vec<(String, Outcome)>,
    default_status: i32,
    output: Vec<String>,
}

impl MockExecutor {
    /// Create a mock executor where everything succeeds silently.
    pub fn new() -> Self {
        MockExecutor::default()
    }

    /// Make the invocation for `target` exit with `status`.
    pub fn fail_target(&mut self, target: &str, status: i32) -> &mut Self {
        self.by_target
            .push((target.to_string(), Outcome::Exit(status)));
        self
    }

    /// Make the invocation for `target` fail to spawn.
    pub fn spawn_error_on_target(&mut self, target: &str) -> &mut Self {
        self.by_target
            .push((target.to_string(), Outcome::SpawnError));
        self
    }

    /// Make every invocation without a scripted outcome exit with `status`.
    pub fn fail_all(&mut self, status: i32) -> &mut Self {
        self.default_status = status;
        self
    }

    /// Lines every invocation writes to its sink.
    pub fn output(&mut self, lines: &[&str]) -> &mut Self {
        self.output = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    /// Get all invocations, in order.
    pub fn calls(&self) -> &[MockInvocation] {
        &self.calls
    }

    /// The `--target` value of each invocation, in order.
    pub fn targets(&self) -> Vec<Option<&str>> {
        self.calls.iter().map(MockInvocation::target).collect()
    }
}

impl Executor for MockExecutor {
    fn execute(
        &mut self,
        invocation: &ProcessBuilder,
        sink: &mut dyn FnMut(&str),
    ) -> Result<InvocationResult, BuildError> {
        let call = MockInvocation {
            program: invocation.get_program().to_path_buf(),
            args: invocation.get_args().to_vec(),
            cwd: invocation.get_cwd().map(|p| p.to_path_buf()),
            env: invocation.get_envs().clone(),
        };

        let outcome = call.target().and_then(|t| {
            self.by_target
                .iter()
                .find(|(name, _)| name == t)
                .map(|(_, outcome)| outcome.clone())
        });
        self.calls.push(call);

        if let Some(Outcome::SpawnError) = outcome {
            return Err(BuildError::ProcessSpawn {
                program: invocation.get_program().display().to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "mock spawn failure"),
            });
        }

        for line in &self.output {
            sink(line);
        }

        let status = match outcome {
            Some(Outcome::Exit(status)) => status,
            _ => self.default_status,
        };

        Ok(InvocationResult::new(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_and_scripts() {
        let mut exec = MockExecutor::new();
        exec.fail_target("b", 7).output(&["hello"]);

        let mut lines = Vec::new();
        let a = ProcessBuilder::new("cmake").args(["--build", ".", "--target", "a"]);
        let b = ProcessBuilder::new("cmake").args(["--build", ".", "--target", "b"]);

        let ra = exec.execute(&a, &mut |l| lines.push(l.to_string())).unwrap();
        let rb = exec.execute(&b, &mut |_| {}).unwrap();

        assert!(ra.success());
        assert_eq!(rb.status, 7);
        assert_eq!(lines, vec!["hello"]);
        assert_eq!(exec.targets(), vec![Some("a"), Some("b")]);
    }
}
