//! Time series of values per component or bus.
use crate::id::IDLike;
use anyhow::{Result, ensure};
use indexmap::IndexMap;

/// A table of values indexed by snapshot, with one column per ID
#[derive(PartialEq, Debug, Clone)]
pub struct TimeSeries<ID: IDLike> {
    num_snapshots: usize,
    columns: IndexMap<ID, Vec<f64>>,
}

impl<ID: IDLike> TimeSeries<ID> {
    /// Create an empty time series covering `num_snapshots` snapshots
    pub fn new(num_snapshots: usize) -> Self {
        Self {
            num_snapshots,
            columns: IndexMap::new(),
        }
    }

    /// The number of snapshots covered
    pub fn num_snapshots(&self) -> usize {
        self.num_snapshots
    }

    /// Add a column, checking that it has the right length and is not a duplicate
    pub fn insert(&mut self, id: ID, values: Vec<f64>) -> Result<()> {
        ensure!(
            values.len() == self.num_snapshots,
            "Time series for {id} has {} values, but there are {} snapshots",
            values.len(),
            self.num_snapshots
        );
        ensure!(
            !self.columns.contains_key(&id),
            "Duplicate time series column: {id}"
        );
        self.columns.insert(id, values);

        Ok(())
    }

    /// Get the column for the given ID
    pub fn get(&self, id: &str) -> Option<&[f64]> {
        self.columns.get(id).map(Vec::as_slice)
    }

    /// Iterate over all columns
    pub fn iter(&self) -> impl Iterator<Item = (&ID, &[f64])> {
        self.columns.iter().map(|(id, values)| (id, values.as_slice()))
    }
}

/// Multiply each value by the corresponding snapshot weighting and sum
pub fn weighted_sum(values: &[f64], weightings: &[f64]) -> f64 {
    values.iter().zip(weightings).map(|(v, w)| v * w).sum()
}
