//! Code for reading the units used to annotate report variables.
use super::{input_err_msg, read_csv};
use crate::variable::VariableName;
use anyhow::{Result, ensure};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// A mapping from variable name to unit label
pub type VariableUnits = IndexMap<VariableName, String>;

#[derive(Deserialize)]
struct VariableUnitRaw {
    #[serde(rename = "Variable")]
    variable: VariableName,
    #[serde(rename = "Unit")]
    unit: String,
}

/// Read the units for report variables from a CSV file with `Variable` and `Unit` columns
pub fn read_variable_units(file_path: &Path) -> Result<VariableUnits> {
    let mut units = VariableUnits::new();
    for raw in read_csv::<VariableUnitRaw>(file_path)? {
        ensure!(
            units.insert(raw.variable.clone(), raw.unit).is_none(),
            "{}: Duplicate unit entry for {}",
            input_err_msg(file_path),
            raw.variable
        );
    }

    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_variable_units() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("units.csv");
        fs::write(
            &file_path,
            "Variable,Unit\nCapacity|Electricity,GW\nPrimary Energy|Gas,PJ/yr\n",
        )
        .unwrap();
        let units = read_variable_units(&file_path).unwrap();
        assert_eq!(units["Capacity|Electricity"], "GW");
        assert_eq!(units.len(), 2);

        fs::write(
            &file_path,
            "Variable,Unit\nCapacity|Electricity,GW\nCapacity|Electricity,MW\n",
        )
        .unwrap();
        assert_error!(
            read_variable_units(&file_path),
            format!(
                "{}: Duplicate unit entry for Capacity|Electricity",
                input_err_msg(&file_path)
            )
        );
    }
}
