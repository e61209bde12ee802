//! cmake-driver - runs the CMake configure, build and clean phases of a
//! project from a declarative configuration.
//!
//! This crate provides the library behind the `cmake-driver` binary:
//! environment interpolation, CMake command composition, process
//! supervision, and phase sequencing.

pub mod builder;
pub mod ops;
pub mod util;

/// Test utilities and mocks for unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a recording executor and project fixtures.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildCoordinator, BuildError, BuildParameters, Executor, SystemExecutor};
pub use util::context::GlobalContext;
