//! CLI integration tests for cmake-driver.
//!
//! The phases are driven against a fake `cmake` shell script that records
//! its arguments, so these tests only run on unix hosts.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const FAKE_CMAKE: &str = r#"#!/bin/sh
echo "invoked: $*"
echo "derived: $DERIVED"
echo "diagnostic on stderr" >&2
echo "$*" >> "$FAKE_CMAKE_LOG"
if [ -n "$FAIL_TARGET" ]; then
    case "$*" in
        *"--target $FAIL_TARGET"*) exit 3 ;;
    esac
fi
exit 0
"#;

/// A project directory with a fake cmake next to it.
struct Project {
    tmp: TempDir,
}

impl Project {
    fn new(config: &str) -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("proj");
        fs::create_dir_all(&root).unwrap();
        fs::write(
            root.join("CMakeLists.txt"),
            "cmake_minimum_required(VERSION 3.10)\nproject(demo C)\n",
        )
        .unwrap();
        fs::write(root.join("cmake-driver.toml"), config).unwrap();

        let script = tmp.path().join("fake-cmake");
        fs::write(&script, FAKE_CMAKE).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        Project { tmp }
    }

    fn root(&self) -> PathBuf {
        self.tmp.path().join("proj")
    }

    fn binary_dir(&self) -> PathBuf {
        self.root().join("target").join("cmake")
    }

    fn log(&self) -> PathBuf {
        self.tmp.path().join("invocations.log")
    }

    fn invocations(&self) -> Vec<String> {
        fs::read_to_string(self.log())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// The driver, run from the project root with the fake cmake selected.
    fn driver(&self, phase: &str) -> Command {
        let mut cmd = Command::cargo_bin("cmake-driver").unwrap();
        cmd.current_dir(self.root())
            .env("XDG_CONFIG_HOME", self.tmp.path().join("xdg"))
            .env("FAKE_CMAKE_LOG", self.log())
            .env_remove("FAIL_TARGET")
            .arg(phase);
        if phase != "clean" {
            cmd.arg("--cmake-path").arg(self.tmp.path().join("fake-cmake"));
        }
        cmd
    }
}

/// The path as the driver sees it after resolving the working directory.
fn path_str(path: &Path) -> String {
    path.canonicalize().unwrap().display().to_string()
}

// ============================================================================
// cmake-driver configure
// ============================================================================

#[test]
fn test_configure_passes_defines_and_source_dir() {
    let project = Project::new(
        r#"
[cmake]
generator = "Unix Makefiles"

[cmake.defines]
FOO = "1"
BAR = "2"
"#,
    );

    project
        .driver("configure")
        .assert()
        .success()
        .stdout(predicate::str::contains("diagnostic on stderr"));

    assert!(project.binary_dir().is_dir());
    assert_eq!(
        project.invocations(),
        vec![format!(
            "-DFOO=1 -DBAR=2 -GUnix Makefiles {}",
            path_str(&project.root())
        )]
    );
}

#[test]
fn test_configure_command_line_overrides() {
    let project = Project::new("[cmake.defines]\nFOO = \"1\"\n");

    project
        .driver("configure")
        .args(["-D", "FOO=9", "-D", "EXTRA=x", "-G", "Ninja"])
        .assert()
        .success();

    assert_eq!(
        project.invocations(),
        vec![format!("-DFOO=9 -DEXTRA=x -GNinja {}", path_str(&project.root()))]
    );
}

#[test]
fn test_configure_interpolates_environment() {
    let project = Project::new("[env]\nDERIVED = \"%BASE_VAR%-1\"\n");

    project
        .driver("configure")
        .env("BASE_VAR", "abc")
        .assert()
        .success()
        .stdout(predicate::str::contains("derived: abc-1"));
}

#[test]
fn test_configure_reject_empty_define() {
    let project = Project::new("[cmake]\ndefine-policy = \"reject\"\n\n[cmake.defines]\nEMPTY = \"\"\n");

    project
        .driver("configure")
        .assert()
        .failure()
        .stderr(predicate::str::contains("EMPTY"));

    assert!(project.invocations().is_empty());
}

#[test]
fn test_configure_missing_cmake() {
    let project = Project::new("");

    Command::cargo_bin("cmake-driver")
        .unwrap()
        .current_dir(project.root())
        .env("XDG_CONFIG_HOME", project.tmp.path().join("xdg"))
        .args(["configure", "--cmake-path", "/nonexistent/cmake"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to spawn"));
}

#[test]
fn test_invalid_config_fails() {
    let project = Project::new("[build]\nconcurrency = \"many\"\n");

    project
        .driver("configure")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config file"));
}

// ============================================================================
// cmake-driver compile / test-compile
// ============================================================================

#[test]
fn test_compile_targets_in_order() {
    let project = Project::new("[build]\ntargets = [\"a\", \"b\", \"c\"]\n");
    fs::create_dir_all(project.binary_dir()).unwrap();

    project.driver("compile").args(["-j", "4"]).assert().success();

    assert_eq!(
        project.invocations(),
        vec![
            "--build . --parallel 4 --target a",
            "--build . --parallel 4 --target b",
            "--build . --parallel 4 --target c",
        ]
    );
}

#[test]
fn test_compile_stops_at_failing_target() {
    let project = Project::new("[build]\ntargets = [\"a\", \"b\", \"c\"]\nconcurrency = 2\n");
    fs::create_dir_all(project.binary_dir()).unwrap();

    project
        .driver("compile")
        .env("FAIL_TARGET", "b")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "cmake --build command failed with exit status of 3 (target `b`)",
        ));

    assert_eq!(
        project.invocations(),
        vec![
            "--build . --parallel 2 --target a",
            "--build . --parallel 2 --target b",
        ]
    );
}

#[test]
fn test_compile_default_target() {
    let project = Project::new("[build]\nconcurrency = 5\noptions = [\"VERBOSE=1\"]\n");
    fs::create_dir_all(project.binary_dir()).unwrap();

    project.driver("compile").assert().success();

    assert_eq!(project.invocations(), vec!["--build . --parallel 5 -- VERBOSE=1"]);
}

#[test]
fn test_compile_before_configure_fails() {
    let project = Project::new("");

    project
        .driver("compile")
        .assert()
        .failure()
        .stderr(predicate::str::contains("run `cmake-driver configure` first"));
}

#[test]
fn test_test_compile_without_test_targets() {
    let project = Project::new("[build]\ntargets = [\"a\"]\n");
    fs::create_dir_all(project.binary_dir()).unwrap();

    project.driver("test-compile").assert().success();

    assert!(project.invocations().is_empty());
}

#[test]
fn test_test_compile_builds_test_targets() {
    let project = Project::new("[build]\ntest-targets = [\"unit\"]\nconcurrency = 2\n");
    fs::create_dir_all(project.binary_dir()).unwrap();

    project.driver("test-compile").assert().success();

    assert_eq!(project.invocations(), vec!["--build . --parallel 2 --target unit"]);
}

// ============================================================================
// cmake-driver clean
// ============================================================================

#[test]
fn test_clean_removes_binary_dir() {
    let project = Project::new("");
    fs::create_dir_all(project.binary_dir().join("CMakeFiles")).unwrap();
    fs::write(project.binary_dir().join("CMakeCache.txt"), "").unwrap();

    project.driver("clean").assert().success();

    assert!(!project.binary_dir().exists());
    assert!(project.root().join("CMakeLists.txt").exists());
}

#[test]
fn test_clean_skip() {
    let project = Project::new("");
    fs::create_dir_all(project.binary_dir()).unwrap();

    project
        .driver("clean")
        .arg("--skip")
        .assert()
        .success()
        .stdout(predicate::str::contains("Clean is skipped."));

    assert!(project.binary_dir().exists());
}

// ============================================================================
// Misc
// ============================================================================

#[test]
fn test_completions() {
    Command::cargo_bin("cmake-driver")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cmake-driver"));
}

#[test]
fn test_help_lists_phases() {
    Command::cargo_bin("cmake-driver")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("configure"))
        .stdout(predicate::str::contains("test-compile"));
}
