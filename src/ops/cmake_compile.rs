//! Implementation of `cmake-driver compile` and `cmake-driver test-compile`.

use anyhow::{bail, Result};

use crate::builder::{BuildCoordinator, Executor};
use crate::ops::layout::{PhaseOptions, ProjectLayout};
use crate::util::config::Config;
use crate::util::GlobalContext;

/// Build the configured targets, or the default target when there are none.
pub fn compile<E: Executor>(ctx: &GlobalContext, opts: &PhaseOptions, executor: &mut E) -> Result<()> {
    let (config, layout) = opts.load(ctx)?;
    let targets = opts.targets_or(&config.build.targets);

    build_targets(&config, &layout, &targets, executor)
}

/// Build the configured test targets. Without test targets nothing runs.
pub fn test_compile<E: Executor>(ctx: &GlobalContext, opts: &PhaseOptions, executor: &mut E) -> Result<()> {
    let (config, layout) = opts.load(ctx)?;
    let targets = opts.targets_or(&config.build.test_targets);

    if targets.is_empty() {
        tracing::info!("No test targets to compile.");
        return Ok(());
    }

    build_targets(&config, &layout, &targets, executor)
}

fn build_targets<E: Executor>(
    config: &Config,
    layout: &ProjectLayout,
    targets: &[String],
    executor: &mut E,
) -> Result<()> {
    if !layout.binary_dir.is_dir() {
        bail!(
            "CMake binary directory `{}` does not exist\n\
             hint: run `cmake-driver configure` first",
            layout.binary_dir.display()
        );
    }

    let params = config.parameters(targets);
    let mut coordinator = BuildCoordinator::new(&params, executor);
    coordinator.build(&layout.binary_dir)?;

    Ok(())
}
