//! Command implementations

pub mod clean;
pub mod compile;
pub mod completions;
pub mod configure;
pub mod test_compile;
