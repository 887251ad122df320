use std::path::Path;

use glottoreg_quality::QualityChecker;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::QualityArgs;
use crate::commands::shared;

/// Handle `glt quality`.
pub fn handle(args: &QualityArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    run(&args.dataset, args.snapshot.as_deref(), flags)
}

pub(crate) fn run(
    dataset_path: &Path,
    snapshot_path: Option<&Path>,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let report = QualityChecker::new().check(dataset_path, snapshot_path)?;
    shared::report::finish("quality", &report, flags.format)
}
