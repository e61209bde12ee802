//! `cmake-driver compile` command

use anyhow::Result;

use crate::cli::PhaseArgs;
use cmake_driver::ops::compile;
use cmake_driver::util::GlobalContext;
use cmake_driver::SystemExecutor;

pub fn execute(ctx: &GlobalContext, args: PhaseArgs) -> Result<()> {
    let mut executor = SystemExecutor::new();
    compile(ctx, &args.options(), &mut executor)?;

    eprintln!("    Finished compile");
    Ok(())
}
