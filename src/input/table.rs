//! Code for reading auxiliary region-indexed tables.
use super::input_err_msg;
use crate::table::RegionTable;
use anyhow::{Context, Result, ensure};
use std::path::Path;

/// Read a table whose first column holds row names and whose other columns hold numbers
pub fn read_region_table(file_path: &Path) -> Result<RegionTable> {
    read_region_table_internal(file_path).with_context(|| input_err_msg(file_path))
}

fn read_region_table_internal(file_path: &Path) -> Result<RegionTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)?;
    let columns: Vec<String> = reader.headers()?.iter().skip(1).map(String::from).collect();

    let mut table = RegionTable {
        columns,
        ..RegionTable::default()
    };
    for record in reader.records() {
        let record = record?;
        let name = record.get(0).unwrap_or_default().to_string();
        let values = record
            .iter()
            .skip(1)
            .zip(&table.columns)
            .map(|(value, column)| {
                value
                    .parse()
                    .with_context(|| format!("Invalid value for {column} in row {name}: {value}"))
            })
            .collect::<Result<Vec<f64>>>()?;
        ensure!(
            table.rows.insert(name.clone(), values).is_none(),
            "Duplicate row: {name}"
        );
    }

    Ok(table)
}
