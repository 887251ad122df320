use std::path::Path;

use glottoreg_schema::{SchemaRegistry, Validator};
use glottoreg_store::dataset;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ValidateArgs;
use crate::commands::shared;

/// Handle `glt validate`.
pub fn handle(args: &ValidateArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    run(&args.dataset, flags)
}

pub(crate) fn run(dataset_path: &Path, flags: &GlobalFlags) -> anyhow::Result<()> {
    let validator = Validator::new(&SchemaRegistry::new())?;
    let text = dataset::read_text(dataset_path)?;
    let report = validator.validate_text(&text);
    shared::report::finish("validate", &report, flags.format)
}
