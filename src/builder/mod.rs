//! CMake phase execution.
//!
//! This module composes CMake command lines and sequences their execution.

pub mod cmake;
pub mod coordinator;
pub mod errors;
pub mod params;

pub use cmake::{DefinePolicy, Defines, HostPlatform};
pub use coordinator::{BuildCoordinator, Executor, SystemExecutor};
pub use errors::BuildError;
pub use params::BuildParameters;
