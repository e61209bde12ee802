//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use cmake_driver::builder::DefinePolicy;
use cmake_driver::ops::PhaseOptions;

/// cmake-driver - Run the CMake phases of a project
#[derive(Parser)]
#[command(name = "cmake-driver")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory (defaults to the nearest directory with a cmake-driver.toml)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the native build system
    Configure(PhaseArgs),

    /// Build the project targets
    Compile(PhaseArgs),

    /// Build the test targets
    TestCompile(PhaseArgs),

    /// Remove the CMake binary directory
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct PhaseArgs {
    /// Path to the cmake executable
    #[arg(long, value_name = "PATH")]
    pub cmake_path: Option<PathBuf>,

    /// CMake generator
    #[arg(short = 'G', long)]
    pub generator: Option<String>,

    /// CMake definition (repeatable)
    #[arg(short = 'D', value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub define: Vec<(String, String)>,

    /// Directory holding the top-level CMakeLists.txt, relative to the current directory
    #[arg(long, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// CMake binary directory, relative to the current directory
    #[arg(long, value_name = "DIR")]
    pub binary_dir: Option<PathBuf>,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Target to build (repeatable)
    #[arg(long)]
    pub target: Vec<String>,

    /// Environment variable for CMake, may reference `%NAME%` (repeatable)
    #[arg(long, value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub env: Vec<(String, String)>,

    /// Handling of definitions without a value: skip or reject
    #[arg(long, value_name = "POLICY")]
    pub define_policy: Option<DefinePolicy>,
}

impl PhaseArgs {
    pub fn options(self) -> PhaseOptions {
        PhaseOptions {
            cmake_path: self.cmake_path,
            generator: self.generator,
            defines: self.define,
            env: self.env,
            jobs: self.jobs,
            targets: self.target,
            source_dir: self.source_dir,
            binary_dir: self.binary_dir,
            define_policy: self.define_policy,
            skip: false,
        }
    }
}

#[derive(Args)]
pub struct CleanArgs {
    /// CMake binary directory, relative to the current directory
    #[arg(long, value_name = "DIR")]
    pub binary_dir: Option<PathBuf>,

    /// Skip the clean step
    #[arg(long)]
    pub skip: bool,
}

impl CleanArgs {
    pub fn options(self) -> PhaseOptions {
        PhaseOptions {
            binary_dir: self.binary_dir,
            skip: self.skip,
            ..Default::default()
        }
    }
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{}`", s))?;
    Ok((key.to_string(), value.to_string()))
}
