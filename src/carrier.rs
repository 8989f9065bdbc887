//! Carriers are the technology tags attached to every asset (e.g. `"CCGT"`, `"onwind"`).
use crate::id::define_id_type;
use indexmap::IndexSet;
use serde::Deserialize;

define_id_type! {CarrierID}

/// A selection of carriers to aggregate over.
///
/// Quantities computed over a [`CarrierSelection::List`] are the sum of the quantity for each
/// carrier in the list.
#[derive(PartialEq, Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CarrierSelection {
    /// A single carrier
    Single(CarrierID),
    /// An explicit list of carriers
    List(Vec<CarrierID>),
}

impl CarrierSelection {
    /// Iterate over the carriers in the selection
    pub fn iter(&self) -> impl Iterator<Item = &CarrierID> {
        let carriers = match self {
            Self::Single(carrier) => std::slice::from_ref(carrier),
            Self::List(carriers) => carriers.as_slice(),
        };
        carriers.iter()
    }
}

impl From<&str> for CarrierSelection {
    fn from(value: &str) -> Self {
        Self::Single(value.into())
    }
}

impl From<CarrierID> for CarrierSelection {
    fn from(value: CarrierID) -> Self {
        Self::Single(value)
    }
}

impl From<&[&str]> for CarrierSelection {
    fn from(value: &[&str]) -> Self {
        Self::List(value.iter().map(|&c| c.into()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for CarrierSelection {
    fn from(value: [&str; N]) -> Self {
        Self::List(value.into_iter().map(CarrierID::from).collect())
    }
}

impl From<Vec<CarrierID>> for CarrierSelection {
    fn from(value: Vec<CarrierID>) -> Self {
        Self::List(value)
    }
}

/// Get all carriers in `carriers` which contain `pattern`, in order of first appearance
pub fn carriers_containing<'a, I>(carriers: I, pattern: &str) -> Vec<CarrierID>
where
    I: IntoIterator<Item = &'a CarrierID>,
{
    carriers
        .into_iter()
        .filter(|carrier| carrier.as_str().contains(pattern))
        .cloned()
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}
