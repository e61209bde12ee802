//! `cmake-driver configure` command

use anyhow::Result;

use crate::cli::PhaseArgs;
use cmake_driver::ops::configure;
use cmake_driver::util::GlobalContext;
use cmake_driver::SystemExecutor;

pub fn execute(ctx: &GlobalContext, args: PhaseArgs) -> Result<()> {
    let mut executor = SystemExecutor::new();
    configure(ctx, &args.options(), &mut executor)?;

    eprintln!("  Configured {}", ctx.project_root().display());
    Ok(())
}
