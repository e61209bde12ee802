//! Test fixtures for common test scenarios.
//!
//! Provides a minimal CMake project on disk together with its project file.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::util::config::PROJECT_CONFIG_FILE;

/// Fixture for a CMake project directory.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    /// Project name, used in CMakeLists.txt.
    pub name: String,
    /// Content of the project configuration file.
    pub config: String,
}

impl ProjectFixture {
    /// Create a fixture with an empty configuration.
    pub fn new(name: impl Into<String>) -> Self {
        ProjectFixture {
            name: name.into(),
            config: String::new(),
        }
    }

    /// Set the project configuration file content.
    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.config = config.into();
        self
    }

    /// Write the fixture into `dir`.
    pub fn write_to(&self, dir: &Path) {
        fs::create_dir_all(dir.join("src")).expect("failed to create src dir");
        fs::write(dir.join("CMakeLists.txt"), cmake_lists(&self.name))
            .expect("failed to write CMakeLists.txt");
        fs::write(dir.join("src").join("lib.c"), minimal_c_source())
            .expect("failed to write source");
        fs::write(dir.join(PROJECT_CONFIG_FILE), &self.config)
            .expect("failed to write project config");
    }

    /// Write the fixture into a fresh temporary directory.
    pub fn create(&self) -> TempDir {
        let tmp = TempDir::new().expect("failed to create temp dir");
        self.write_to(tmp.path());
        tmp
    }
}

/// Minimal CMakeLists.txt for a static library called `name`.
pub fn cmake_lists(name: &str) -> String {
    format!(
        r#"cmake_minimum_required(VERSION 3.10)
project({name} C)

add_library({name} STATIC src/lib.c)
"#
    )
}

/// Create a minimal C source file.
pub fn minimal_c_source() -> &'static str {
    r#"// Minimal C source
int placeholder_func(void) {
    return 0;
}
"#
}
