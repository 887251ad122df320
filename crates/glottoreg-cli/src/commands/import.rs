use std::path::Path;

use glottoreg_import::{Defaults, ImportOptions};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{ImportArgs, ImportFlags};
use crate::commands::shared;
use crate::output;

/// Handle `glt import`.
pub fn handle(args: &ImportArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let options = to_options(&args.flags)?;
    run(&args.input, &args.dataset, &options, flags)
}

/// Translate CLI import flags into importer options.
pub(crate) fn to_options(import_flags: &ImportFlags) -> anyhow::Result<ImportOptions> {
    let defaults = Defaults {
        created: Some(
            import_flags
                .default_created
                .unwrap_or_else(|| chrono::Local::now().date_naive()),
        ),
        curation_status: shared::parse::parse_enum(
            &import_flags.default_status,
            "default curation status",
        )?,
        maintainers: import_flags.default_maintainers.clone(),
    };
    Ok(ImportOptions {
        mode: import_flags.mode.into(),
        on_row_error: import_flags.on_row_error.into(),
        delimiter: import_flags.delimiter.into(),
        strict_columns: import_flags.strict_columns,
        validate: import_flags.validate,
        validate_dataset: import_flags.validate_dataset,
        defaults,
    })
}

pub(crate) fn run(
    input: &Path,
    dataset_path: &Path,
    options: &ImportOptions,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let outcome = glottoreg_import::import(input, dataset_path, options)?;

    match flags.format {
        crate::cli::OutputFormat::Text => {
            if !flags.quiet {
                println!(
                    "import: {} appended, {} updated, {} skipped",
                    outcome.appended, outcome.updated, outcome.skipped
                );
            }
        }
        crate::cli::OutputFormat::Json => output::json(&serde_json::json!({
            "appended": outcome.appended,
            "updated": outcome.updated,
            "skipped": outcome.skipped,
            "written": outcome.written,
        }))?,
    }

    shared::report::finish("import", &outcome.report, flags.format)
}
