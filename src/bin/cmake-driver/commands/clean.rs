//! `cmake-driver clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use cmake_driver::ops::clean;
use cmake_driver::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: CleanArgs) -> Result<()> {
    let report = clean(ctx, &args.options())?;

    if report.removed > 0 {
        eprintln!("     Removed {} files", report.removed);
    }
    if !report.failed.is_empty() {
        eprintln!("     Failed to remove {} files", report.failed.len());
    }

    Ok(())
}
