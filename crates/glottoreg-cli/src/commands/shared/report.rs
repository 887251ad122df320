use anyhow::bail;

use glottoreg_core::report::Report;

use crate::cli::OutputFormat;
use crate::output;

/// Print a stage's report and turn its errors into the process exit
/// code: warnings-only is success, any error fails the stage.
pub fn finish(stage: &str, report: &Report, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => output::json(report)?,
        OutputFormat::Text => {
            let rendered = report.render();
            if !rendered.is_empty() {
                print!("{rendered}");
            }
        }
    }

    if report.is_clean() {
        if format == OutputFormat::Text {
            println!("{stage}: ok");
        }
        Ok(())
    } else {
        bail!("{stage}: {} violation(s) found", report.errors.len())
    }
}
