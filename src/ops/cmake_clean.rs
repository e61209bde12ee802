//! Implementation of `cmake-driver clean`.

use std::path::Path;

use anyhow::{Context, Result};
use glob::Pattern;

use crate::ops::layout::PhaseOptions;
use crate::util::fs::{CleanReport, Cleaner};
use crate::util::GlobalContext;

/// Delete the CMake binary directory, keeping paths matched by the
/// configured exclude patterns.
pub fn clean(ctx: &GlobalContext, opts: &PhaseOptions) -> Result<CleanReport> {
    let (config, layout) = opts.load(ctx)?;
    let options = config.clean_options();

    tracing::debug!("cmake binary directory = {}", layout.binary_dir.display());
    tracing::debug!("follow symlinks        = {}", options.follow_symlinks);
    tracing::debug!("fail on error          = {}", options.fail_on_error);
    tracing::debug!("retry on error         = {}", options.retry_on_error);

    if config.clean.skip.unwrap_or(false) {
        tracing::info!("Clean is skipped.");
        return Ok(CleanReport::default());
    }

    let patterns = config
        .clean
        .exclude
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("invalid exclude pattern `{}`", p)))
        .collect::<Result<Vec<_>>>()?;

    let binary_dir = layout.binary_dir.as_path();
    let mut cleaner = Cleaner::new(options);
    if !patterns.is_empty() {
        cleaner = cleaner.exclude(|path| is_excluded(&patterns, binary_dir, path));
    }

    cleaner.delete(binary_dir).context("failed to clean project")
}

fn is_excluded(patterns: &[Pattern], root: &Path, path: &Path) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return false;
    };
    patterns.iter().any(|p| p.matches_path(relative))
}
