//! Shared output formatting for check results.

use anyhow::Result;
use import_fence_core::{report, CheckReport};

use crate::OutputFormat;

/// Prints `report` to stdout in the requested format.
pub fn print(report: &CheckReport, format: OutputFormat) -> Result<()> {
    let rendered = report::render(report, format.into())?;
    print!("{rendered}");
    if !rendered.is_empty() && !rendered.ends_with('\n') {
        println!();
    }
    Ok(())
}
