//! The solved network snapshot from which report variables are extracted.
//!
//! A [`Network`] holds the results of one optimisation run (i.e. one scenario year). It is never
//! modified after loading.
use crate::region::RegionFilter;
use anyhow::{Result, ensure};

pub mod bus;
use bus::{BusID, BusMap};
pub mod component;
use component::{ComponentKind, ComponentTable};
pub mod port;
pub mod series;
use series::TimeSeries;

/// A solved network for a single year
#[derive(PartialEq, Debug, Clone)]
pub struct Network {
    /// Duration (hours) represented by each snapshot
    pub snapshot_weightings: Vec<f64>,
    /// The buses of the network
    pub buses: BusMap,
    /// Marginal price at each bus and snapshot (currency/`MWh`)
    pub marginal_prices: TimeSeries<BusID>,
    /// Generators
    pub generators: ComponentTable,
    /// Storage units
    pub storage_units: ComponentTable,
    /// Stores
    pub stores: ComponentTable,
    /// Loads
    pub loads: ComponentTable,
    /// Links
    pub links: ComponentTable,
    /// Lines
    pub lines: ComponentTable,
}

impl Network {
    /// Create an empty network with the given snapshot weightings
    pub fn new(snapshot_weightings: Vec<f64>) -> Self {
        let num_snapshots = snapshot_weightings.len();
        Self {
            snapshot_weightings,
            buses: BusMap::new(),
            marginal_prices: TimeSeries::new(num_snapshots),
            generators: ComponentTable::new(ComponentKind::Generator),
            storage_units: ComponentTable::new(ComponentKind::StorageUnit),
            stores: ComponentTable::new(ComponentKind::Store),
            loads: ComponentTable::new(ComponentKind::Load),
            links: ComponentTable::new(ComponentKind::Link),
            lines: ComponentTable::new(ComponentKind::Line),
        }
    }

    /// The number of snapshots
    pub fn num_snapshots(&self) -> usize {
        self.snapshot_weightings.len()
    }

    /// Get the table for the given kind of component
    pub fn table(&self, kind: ComponentKind) -> &ComponentTable {
        match kind {
            ComponentKind::Generator => &self.generators,
            ComponentKind::StorageUnit => &self.storage_units,
            ComponentKind::Store => &self.stores,
            ComponentKind::Load => &self.loads,
            ComponentKind::Link => &self.links,
            ComponentKind::Line => &self.lines,
        }
    }

    /// Get a mutable reference to the table for the given kind of component
    pub fn table_mut(&mut self, kind: ComponentKind) -> &mut ComponentTable {
        match kind {
            ComponentKind::Generator => &mut self.generators,
            ComponentKind::StorageUnit => &mut self.storage_units,
            ComponentKind::Store => &mut self.stores,
            ComponentKind::Load => &mut self.loads,
            ComponentKind::Link => &mut self.links,
            ComponentKind::Line => &mut self.lines,
        }
    }

    /// Whether the bus with the given name is in the region.
    ///
    /// Buses which don't appear in the bus table are matched on their name alone.
    pub fn is_bus_in_region(&self, bus: &str, region: &RegionFilter) -> bool {
        let location = self.buses.get(bus).and_then(|b| b.location.as_deref());
        region.matches(bus, location)
    }

    /// Check that every port is connected to a known bus
    pub fn validate_buses(&self) -> Result<()> {
        for table in [
            &self.generators,
            &self.storage_units,
            &self.stores,
            &self.loads,
            &self.links,
            &self.lines,
        ] {
            for component in table.iter() {
                for bus in component.ports.iter().filter_map(|p| p.bus.as_ref()) {
                    ensure!(
                        self.buses.contains_key(bus),
                        "{} entry {} is connected to unknown bus {}",
                        table.kind,
                        component.id,
                        bus
                    );
                }
            }
        }

        Ok(())
    }
}
