//! cmake-driver CLI - runs the CMake phases of a project

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cmake_driver::GlobalContext;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("cmake_driver=debug")
    } else {
        EnvFilter::new("cmake_driver=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let ctx = match cli.project {
        Some(dir) => GlobalContext::with_cwd(dir)?,
        None => GlobalContext::new()?,
    };

    // Execute command
    match cli.command {
        Commands::Configure(args) => commands::configure::execute(&ctx, args),
        Commands::Compile(args) => commands::compile::execute(&ctx, args),
        Commands::TestCompile(args) => commands::test_compile::execute(&ctx, args),
        Commands::Clean(args) => commands::clean::execute(&ctx, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
