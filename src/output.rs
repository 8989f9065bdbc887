//! The module responsible for writing output data to disk.
use crate::variable::ReportTable;
use anyhow::{Context, Result, ensure};
use itertools::chain;
use std::fs;
use std::path::{Path, PathBuf};

pub mod metadata;
pub use metadata::write_metadata;

/// The root folder in which run-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "energy_report_results";

/// The output file name for the report
pub const REPORT_FILE_NAME: &str = "report.csv";

/// The columns which come before the year columns in the report
const KEY_COLUMNS: [&str; 5] = ["Model", "Scenario", "Region", "Variable", "Unit"];

/// Get the output folder for the run in the specified directory
pub fn get_output_dir(run_dir: &Path) -> Result<PathBuf> {
    // Canonicalise in case the user has specified "."
    let run_dir = run_dir
        .canonicalize()
        .context("Could not resolve path to run directory")?;

    let run_name = run_dir
        .file_name()
        .context("Run directory cannot be the root folder")?
        .to_str()
        .context("Invalid chars in run directory name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, run_name].iter().collect())
}

/// Create a new output directory.
///
/// If the directory already exists and is not empty, it is only replaced if `allow_overwrite` is
/// true.
///
/// # Returns
///
/// Whether an existing directory was overwritten
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Empty folder; nothing to overwrite
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Please use --overwrite or change \
            the overwrite setting to replace it."
        );

        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Write the report in long format to `report.csv`.
///
/// There is one column for each year in `years`. Cells for years without a value are left empty.
pub fn write_report(
    output_dir: &Path,
    model: &str,
    scenario: &str,
    years: &[u32],
    report: &ReportTable,
) -> Result<()> {
    let file_path = output_dir.join(REPORT_FILE_NAME);
    let mut writer = csv::Writer::from_path(&file_path)
        .with_context(|| format!("Could not create {}", file_path.display()))?;

    let year_columns = years.iter().map(ToString::to_string);
    writer.write_record(chain(KEY_COLUMNS.map(String::from), year_columns))?;

    for (key, values) in report.iter() {
        let key_cells = [
            model.to_string(),
            scenario.to_string(),
            key.region.to_string(),
            key.variable.to_string(),
            key.unit.clone(),
        ];
        let value_cells = years.iter().map(|year| {
            values
                .get(year)
                .map(ToString::to_string)
                .unwrap_or_default()
        });
        writer.write_record(chain(key_cells, value_cells))?;
    }
    writer.flush()?;

    Ok(())
}
