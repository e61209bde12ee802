//! Sequencing of CMake invocations for the configure and build phases.
//!
//! The coordinator composes each command line, resolves the supplied
//! environment against a fresh snapshot of the ambient environment, hands the
//! invocation to an [`Executor`], and turns an unsuccessful exit into a
//! [`BuildError::BuildFailure`]. Invocations run one at a time; the build
//! phase stops at the first failing target.

use std::fs;
use std::path::{Path, PathBuf};

use crate::builder::cmake::{cmake_program, configure_command, target_command, HostPlatform};
use crate::builder::errors::BuildError;
use crate::builder::params::{resolve_concurrency, BuildParameters};
use crate::util::env::{self, Environment};
use crate::util::process::{Interrupt, InvocationResult, ProcessBuilder};

/// Tool name reported when the configure step fails.
pub const CONFIGURE_TOOL: &str = "cmake";

/// Tool name reported when a build step fails.
pub const BUILD_TOOL: &str = "cmake --build";

/// Runs one invocation to completion.
pub trait Executor {
    /// Run `invocation`, passing each output line to `sink`, and report how
    /// it exited. A non-zero exit is not an error at this level.
    fn execute(
        &mut self,
        invocation: &ProcessBuilder,
        sink: &mut dyn FnMut(&str),
    ) -> Result<InvocationResult, BuildError>;
}

impl<E: Executor + ?Sized> Executor for &mut E {
    fn execute(
        &mut self,
        invocation: &ProcessBuilder,
        sink: &mut dyn FnMut(&str),
    ) -> Result<InvocationResult, BuildError> {
        (**self).execute(invocation, sink)
    }
}

/// Executor that spawns real processes.
#[derive(Debug, Clone, Default)]
pub struct SystemExecutor {
    interrupt: Interrupt,
}

impl SystemExecutor {
    pub fn new() -> Self {
        SystemExecutor::default()
    }

    /// Use `interrupt` to cancel running invocations.
    ///
    /// Embedders keep a clone and raise it from a signal handler or watchdog
    /// thread; the running child is killed and the phase fails with
    /// [`BuildError::ProcessInterrupted`]. [`SystemExecutor::new`] uses an
    /// interrupt nobody else holds.
    pub fn with_interrupt(interrupt: Interrupt) -> Self {
        SystemExecutor { interrupt }
    }
}

impl Executor for SystemExecutor {
    fn execute(
        &mut self,
        invocation: &ProcessBuilder,
        sink: &mut dyn FnMut(&str),
    ) -> Result<InvocationResult, BuildError> {
        invocation.exec_streaming(sink, &self.interrupt)
    }
}

/// Default line sink: child output goes to the log.
pub fn log_line(line: &str) {
    tracing::info!("{}", line);
}

/// Drives the configure and build phases for one set of parameters.
pub struct BuildCoordinator<'a, E: Executor> {
    params: &'a BuildParameters,
    executor: E,
    program: PathBuf,
    platform: HostPlatform,
    sink: Box<dyn FnMut(&str) + 'a>,
    ambient: Box<dyn Fn() -> Environment + 'a>,
}

impl<'a, E: Executor> BuildCoordinator<'a, E> {
    /// Create a coordinator for the current host, logging child output.
    pub fn new(params: &'a BuildParameters, executor: E) -> Self {
        BuildCoordinator {
            params,
            executor,
            program: cmake_program(params.cmake_path.as_deref()),
            platform: HostPlatform::current(),
            sink: Box::new(log_line),
            ambient: Box::new(env::snapshot),
        }
    }

    /// Compose commands for `platform` instead of the current host.
    pub fn platform(mut self, platform: HostPlatform) -> Self {
        self.platform = platform;
        self
    }

    /// Send child output lines to `sink` instead of the log.
    pub fn sink(mut self, sink: impl FnMut(&str) + 'a) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Take ambient environment snapshots from `source` instead of the
    /// process environment. Called once per invocation.
    pub fn ambient_env(mut self, source: impl Fn() -> Environment + 'a) -> Self {
        self.ambient = Box::new(source);
        self
    }

    /// The CMake executable that will be launched.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Give back the executor, e.g. to inspect what it ran.
    pub fn into_executor(self) -> E {
        self.executor
    }

    /// Run the configure step in `binary_dir` for the sources in `source_dir`.
    pub fn configure(&mut self, source_dir: &Path, binary_dir: &Path) -> Result<(), BuildError> {
        tracing::debug!("cmake source directory = {}", source_dir.display());
        tracing::debug!("cmake binary directory = {}", binary_dir.display());
        tracing::debug!("cmake defines          = {}", self.params.defines_display());

        fs::create_dir_all(binary_dir).map_err(|e| {
            BuildError::config(format!(
                "cannot create CMake build directory `{}`: {}",
                binary_dir.display(),
                e
            ))
        })?;

        let args = configure_command(
            source_dir,
            &self.params.defines,
            self.params.generator.as_deref(),
            self.platform,
            &self.params.cmake_args,
            self.params.define_policy,
        )?;

        let invocation = self.invocation(binary_dir, args)?;
        self.run(&invocation, CONFIGURE_TOOL, None)
    }

    /// Build the requested targets in `binary_dir`, one invocation per
    /// target, or the default target when none were requested.
    pub fn build(&mut self, binary_dir: &Path) -> Result<(), BuildError> {
        let concurrency = resolve_concurrency(self.params.concurrency);

        tracing::debug!("cmake binary directory = {}", binary_dir.display());
        tracing::debug!("concurrency            = {}", concurrency);
        tracing::debug!("targets                = {}", self.params.targets_display());

        if self.params.targets.is_empty() {
            let args = target_command(concurrency, None, &self.params.build_options);
            let invocation = self.invocation(binary_dir, args)?;
            return self.run(&invocation, BUILD_TOOL, None);
        }

        let params = self.params;
        for target in &params.targets {
            let args = target_command(concurrency, Some(target), &params.build_options);
            let invocation = self.invocation(binary_dir, args)?;
            self.run(&invocation, BUILD_TOOL, Some(target))?;
        }

        Ok(())
    }

    fn invocation(&self, cwd: &Path, args: Vec<String>) -> Result<ProcessBuilder, BuildError> {
        let ambient = (self.ambient)();
        let resolved = env::resolve(&ambient, &self.params.env)?;

        for (name, value) in &resolved {
            tracing::debug!("env {} = {}", name, value);
        }

        Ok(ProcessBuilder::new(&self.program)
            .args(args)
            .envs(resolved)
            .cwd(cwd))
    }

    fn run(&mut self, invocation: &ProcessBuilder, tool: &str, target: Option<&str>) -> Result<(), BuildError> {
        tracing::info!("command line: {}", invocation.display_command());

        let result = self.executor.execute(invocation, &mut *self.sink)?;

        if !result.success() {
            return Err(BuildError::BuildFailure {
                tool: tool.to_string(),
                status: result.status,
                target: target.map(str::to_string),
            });
        }

        Ok(())
    }
}
