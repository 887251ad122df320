use crate::cli::{GlobalFlags, OutputFormat};
use crate::cli::root_commands::PipelineArgs;
use crate::commands::{build, import, quality, validate};

/// Handle `glt pipeline`: import, rebuild the snapshot, validate, then
/// quality-check. Halts at the first failing stage and names it.
pub fn handle(args: &PipelineArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let options = import::to_options(&args.flags)?;

    import::run(&args.input, &args.dataset, &options, flags)
        .map_err(|error| error.context("pipeline halted at stage: import"))?;
    build::run(&args.dataset, &args.snapshot, flags)
        .map_err(|error| error.context("pipeline halted at stage: build"))?;
    validate::run(&args.dataset, flags)
        .map_err(|error| error.context("pipeline halted at stage: validate"))?;
    quality::run(&args.dataset, Some(&args.snapshot), flags)
        .map_err(|error| error.context("pipeline halted at stage: quality"))?;

    if flags.format == OutputFormat::Text && !flags.quiet {
        println!("pipeline: ok");
    }
    Ok(())
}
