//! Report variables and the tables they are collected into.
use crate::id::define_id_type;
use crate::region::RegionID;
use anyhow::{Result, ensure};
use indexmap::IndexMap;
use std::collections::BTreeMap;

define_id_type! {VariableName}

/// The unit label used for variables with no known unit
pub const UNKNOWN_UNIT: &str = "NA";

/// Computed values for each variable, in the order they are defined
pub type VariableMap = IndexMap<VariableName, f64>;

/// Check that a variable name is a valid pipe-delimited path (e.g. `Capacity|Electricity|Wind`)
pub fn check_variable_name(name: &str) -> Result<()> {
    ensure!(!name.trim().is_empty(), "Variable name cannot be empty");
    ensure!(
        name.split('|').all(|segment| !segment.trim().is_empty()),
        "Invalid variable name {name}: path segments cannot be empty"
    );
    ensure!(
        name.split('|').all(|segment| segment == segment.trim()),
        "Invalid variable name {name}: path segments cannot have leading or trailing whitespace"
    );

    Ok(())
}

/// Identifies a row of a [`ReportTable`]
#[derive(PartialEq, Eq, Hash, Debug, Clone, PartialOrd, Ord)]
pub struct ReportKey {
    /// The region the values are for
    pub region: RegionID,
    /// The variable name
    pub variable: VariableName,
    /// The unit of the values
    pub unit: String,
}

/// A table of report values with one row per region, variable and unit and one column per year
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ReportTable {
    rows: IndexMap<ReportKey, BTreeMap<u32, f64>>,
}

impl ReportTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single value to the table
    pub fn insert(&mut self, key: ReportKey, year: u32, value: f64) -> Result<()> {
        let values = self.rows.entry(key).or_default();
        ensure!(
            !values.contains_key(&year),
            "Duplicate value for year {year}"
        );
        values.insert(year, value);

        Ok(())
    }

    /// Merge another table into this one.
    ///
    /// Rows with the same key are combined. It is an error for both tables to hold a value for the
    /// same row and year.
    pub fn merge(&mut self, other: ReportTable) -> Result<()> {
        for (key, values) in other.rows {
            let row = self.rows.entry(key.clone()).or_default();
            for (year, value) in values {
                ensure!(
                    row.insert(year, value).is_none(),
                    "Duplicate value for {} in {} for year {year}",
                    key.variable,
                    key.region
                );
            }
        }

        Ok(())
    }

    /// The number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over rows, sorted by key
    pub fn iter(&self) -> impl Iterator<Item = (&ReportKey, &BTreeMap<u32, f64>)> {
        let mut rows: Vec<_> = self.rows.iter().collect();
        rows.sort_by(|a, b| a.0.cmp(b.0));
        rows.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use rstest::rstest;

    fn key(region: &str, variable: &str) -> ReportKey {
        ReportKey {
            region: region.into(),
            variable: variable.into(),
            unit: "GW".into(),
        }
    }

    fn table(year: u32, values: &[(&str, &str, f64)]) -> ReportTable {
        let mut table = ReportTable::new();
        for &(region, variable, value) in values {
            table.insert(key(region, variable), year, value).unwrap();
        }
        table
    }

    #[rstest]
    #[case("Capacity")]
    #[case("Capacity|Electricity|Gas|CC")]
    #[case("Final Energy|Industry|Electricity")]
    fn test_check_variable_name_valid(#[case] name: &str) {
        assert!(check_variable_name(name).is_ok());
    }

    #[rstest]
    #[case("", "Variable name cannot be empty")]
    #[case(
        "Capacity||Wind",
        "Invalid variable name Capacity||Wind: path segments cannot be empty"
    )]
    #[case(
        "Capacity|",
        "Invalid variable name Capacity|: path segments cannot be empty"
    )]
    #[case(
        "Capacity | Wind",
        "Invalid variable name Capacity | Wind: path segments cannot have leading or trailing \
        whitespace"
    )]
    fn test_check_variable_name_invalid(#[case] name: &str, #[case] msg: &str) {
        assert_error!(check_variable_name(name), msg);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let a = table(2020, &[("DE", "Capacity", 1.0), ("DE", "Capacity|Wind", 0.5)]);
        let b = table(2030, &[("DE", "Capacity", 2.0), ("FR", "Capacity", 3.0)]);

        let mut ab = a.clone();
        ab.merge(b.clone()).unwrap();
        let mut ba = b;
        ba.merge(a).unwrap();

        itertools::assert_equal(ab.iter(), ba.iter());
        assert_eq!(ab.len(), 3);

        // Rows are sorted by region, then variable
        let rows: Vec<_> = ab.iter().collect();
        assert_eq!(rows[0].0, &key("DE", "Capacity"));
        assert_eq!(rows[0].1.keys().copied().collect::<Vec<_>>(), [2020, 2030]);
        assert_eq!(rows[2].0, &key("FR", "Capacity"));
        assert!(!rows[2].1.contains_key(&2020));
    }

    #[test]
    fn test_merge_duplicate() {
        let mut a = table(2020, &[("DE", "Capacity", 1.0)]);
        let b = table(2020, &[("DE", "Capacity", 1.0)]);
        assert_error!(a.merge(b), "Duplicate value for Capacity in DE for year 2020");
    }
}
