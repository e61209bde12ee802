//! `cmake-driver test-compile` command

use anyhow::Result;

use crate::cli::PhaseArgs;
use cmake_driver::ops::test_compile;
use cmake_driver::util::GlobalContext;
use cmake_driver::SystemExecutor;

pub fn execute(ctx: &GlobalContext, args: PhaseArgs) -> Result<()> {
    let mut executor = SystemExecutor::new();
    test_compile(ctx, &args.options(), &mut executor)?;

    eprintln!("    Finished test-compile");
    Ok(())
}
