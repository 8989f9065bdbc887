//! Buses are the nodes of the network to which components are attached.
use crate::carrier::CarrierID;
use crate::id::define_id_type;
use indexmap::IndexMap;

define_id_type! {BusID}

/// The name of the bus representing the atmosphere.
///
/// Flow into this bus is emitted CO2, flow out of it is CO2 removed from the atmosphere.
pub const ATMOSPHERE_BUS: &str = "co2 atmosphere";

/// A map of [`Bus`]es, keyed by name
pub type BusMap = IndexMap<BusID, Bus>;

/// A node of the network
#[derive(PartialEq, Debug, Clone)]
pub struct Bus {
    /// The bus name (e.g. "DE1 0 low voltage")
    pub id: BusID,
    /// The energy carrier at this bus (e.g. "low voltage")
    pub carrier: CarrierID,
    /// Explicit location of the bus, if provided
    pub location: Option<String>,
}
