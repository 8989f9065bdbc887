//! Auxiliary tables of values indexed by region (e.g. industrial energy demand per node).
use crate::region::RegionFilter;
use crate::units::{CONVERSIONS, Energy};
use anyhow::{Context, Result};
use indexmap::IndexMap;

/// Auxiliary tables for a single year, keyed by the name used in report definitions
pub type TableMap = IndexMap<String, RegionTable>;

/// A numeric table with one row per location and named columns
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RegionTable {
    /// The column names, in file order
    pub columns: Vec<String>,
    /// The values for each row, keyed by row name
    pub rows: IndexMap<String, Vec<f64>>,
}

impl RegionTable {
    /// Get the position of a column
    fn column_index(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .with_context(|| format!("Unknown column: {column}"))
    }

    /// Sum the given columns over rows belonging to the region.
    ///
    /// Values are in `TWh` and the result is in PJ.
    pub fn sum(&self, columns: &[String], region: &RegionFilter) -> Result<Energy> {
        let indexes: Vec<_> = columns
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<_>>()?;

        let mut twh: f64 = 0.0;
        for (name, values) in self.rows.iter().filter(|(name, _)| region.matches(name, None)) {
            for (&i, column) in indexes.iter().zip(columns) {
                twh += values
                    .get(i)
                    .with_context(|| format!("Row {name} has no value for column {column}"))?;
            }
        }

        Ok(Energy(twh) * CONVERSIONS.twh_to_pj)
    }
}
