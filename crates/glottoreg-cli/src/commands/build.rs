use std::path::Path;

use glottoreg_store::snapshot;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::cli::root_commands::BuildArgs;
use crate::commands::shared;
use crate::output;

/// Handle `glt build`.
pub fn handle(args: &BuildArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    if args.check {
        let report = snapshot::check(&args.dataset, &args.snapshot)?;
        return shared::report::finish("snapshot check", &report, flags.format);
    }
    run(&args.dataset, &args.snapshot, flags)
}

pub(crate) fn run(
    dataset_path: &Path,
    snapshot_path: &Path,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let records = snapshot::write(dataset_path, snapshot_path)?;
    match flags.format {
        OutputFormat::Text => {
            if !flags.quiet {
                println!(
                    "build: {records} record(s) -> {}",
                    snapshot_path.display()
                );
            }
        }
        OutputFormat::Json => output::json(&serde_json::json!({
            "records": records,
            "snapshot": snapshot_path.display().to_string(),
        }))?,
    }
    Ok(())
}
