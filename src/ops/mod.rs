//! High-level operations.
//!
//! This module contains the implementation of the driver's phases.

pub mod cmake_clean;
pub mod cmake_compile;
pub mod cmake_configure;
pub mod layout;

pub use cmake_clean::clean;
pub use cmake_compile::{compile, test_compile};
pub use cmake_configure::configure;
pub use layout::{PhaseOptions, ProjectLayout};
