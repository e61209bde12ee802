//! Implementation of `cmake-driver configure`.

use anyhow::Result;

use crate::builder::cmake::is_cmake_project;
use crate::builder::{BuildCoordinator, Executor};
use crate::ops::layout::PhaseOptions;
use crate::util::GlobalContext;

/// Generate the native build system in the binary directory.
pub fn configure<E: Executor>(ctx: &GlobalContext, opts: &PhaseOptions, executor: &mut E) -> Result<()> {
    let (config, layout) = opts.load(ctx)?;
    let params = config.parameters(&[]);

    if !is_cmake_project(&layout.source_dir) {
        tracing::warn!("no CMakeLists.txt in {}", layout.source_dir.display());
    }

    tracing::debug!("project root           = {}", layout.root.display());
    tracing::debug!("generator              = {}", params.generator.as_deref().unwrap_or("<default>"));
    tracing::debug!("define policy          = {:?}", params.define_policy);

    let mut coordinator = BuildCoordinator::new(&params, executor);
    coordinator.configure(&layout.source_dir, &layout.binary_dir)?;

    Ok(())
}
