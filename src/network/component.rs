//! Components are the assets of the network: generators, storage, links, lines and loads.
use super::port::{Port, PortRole};
use super::series::TimeSeries;
use crate::carrier::CarrierID;
use crate::id::define_id_type;
use crate::region::RegionFilter;
use anyhow::{Result, ensure};
use indexmap::IndexMap;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use strum::EnumIter;

define_id_type! {ComponentID}

/// The kind of asset stored in a [`ComponentTable`]
#[derive(
    PartialEq,
    Eq,
    Hash,
    Debug,
    Clone,
    Copy,
    EnumIter,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum ComponentKind {
    /// Generators inject energy at a single bus
    #[string = "generators"]
    Generator,
    /// Storage defined by power capacity and a maximum discharge duration
    #[string = "storage_units"]
    StorageUnit,
    /// Pure energy stores
    #[string = "stores"]
    Store,
    /// Demand at a single bus
    #[string = "loads"]
    Load,
    /// Converters between two or more buses
    #[string = "links"]
    Link,
    /// AC transmission lines
    #[string = "lines"]
    Line,
}

impl ComponentKind {
    /// Whether components of this kind have a variable number of ports (`bus0`, `bus1`, ...)
    pub fn is_multi_port(self) -> bool {
        matches!(self, Self::Link | Self::Line)
    }

    /// The role of the single port of a one-port component
    pub fn single_port_role(self) -> PortRole {
        match self {
            Self::Load => PortRole::Input,
            _ => PortRole::PrimaryOutput,
        }
    }
}

/// A single asset
#[derive(PartialEq, Debug, Clone)]
pub struct Component {
    /// Unique name of the asset, which embeds its location (e.g. "DE1 0 OCGT")
    pub id: ComponentID,
    /// Technology tag
    pub carrier: CarrierID,
    /// Explicit location, overriding the one embedded in the name
    pub location: Option<String>,
    /// Connections to buses, in port order
    pub ports: Vec<Port>,
    /// Optimised nominal power (MW)
    pub p_nom_opt: f64,
    /// Optimised nominal energy (`MWh`)
    pub e_nom_opt: f64,
    /// Optimised nominal apparent power of lines (MVA)
    pub s_nom_opt: f64,
    /// Hours of storage at full power
    pub max_hours: f64,
    /// Length of lines and links (km)
    pub length: f64,
}

impl Component {
    /// Whether the component belongs to the region
    pub fn is_in_region(&self, region: &RegionFilter) -> bool {
        region.matches(self.id.as_str(), self.location.as_deref())
    }

    /// Get the port with the given index, if the component has it
    pub fn port(&self, index: usize) -> Option<&Port> {
        self.ports.get(index).filter(|port| port.bus.is_some())
    }
}

/// All assets of one kind, along with their flow time series
#[derive(PartialEq, Debug, Clone)]
pub struct ComponentTable {
    /// The kind of assets in the table
    pub kind: ComponentKind,
    components: IndexMap<ComponentID, Component>,
    /// Flow time series for each port, indexed by port number
    flows: Vec<TimeSeries<ComponentID>>,
}

impl ComponentTable {
    /// Create an empty table
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            components: IndexMap::new(),
            flows: Vec::new(),
        }
    }

    /// Add a component to the table
    pub fn insert(&mut self, component: Component) -> Result<()> {
        ensure!(
            !self.components.contains_key(&component.id),
            "Duplicate {} entry: {}",
            self.kind,
            component.id
        );
        self.components.insert(component.id.clone(), component);

        Ok(())
    }

    /// Set the flow time series for a port
    pub fn set_flows(&mut self, port: usize, series: TimeSeries<ComponentID>) {
        let num_snapshots = series.num_snapshots();
        if self.flows.len() <= port {
            self.flows
                .resize_with(port + 1, || TimeSeries::new(num_snapshots));
        }
        self.flows[port] = series;
    }

    /// Get the flow time series for a port
    pub fn flows(&self, port: usize) -> Option<&TimeSeries<ComponentID>> {
        self.flows.get(port)
    }

    /// The number of components in the table
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Get a component by name
    pub fn get(&self, id: &str) -> Option<&Component> {
        self.components.get(id)
    }

    /// Iterate over all components
    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Iterate over the carriers of all components (with repeats)
    pub fn carriers(&self) -> impl Iterator<Item = &CarrierID> {
        self.components.values().map(|c| &c.carrier)
    }

    /// Iterate over components with the given carrier
    pub fn iter_carrier<'a>(&'a self, carrier: &'a CarrierID) -> impl Iterator<Item = &'a Component> {
        self.iter().filter(move |c| &c.carrier == carrier)
    }

    /// Iterate over components with the given carrier in the given region
    pub fn iter_matching<'a>(
        &'a self,
        carrier: &'a CarrierID,
        region: &'a RegionFilter,
    ) -> impl Iterator<Item = &'a Component> {
        self.iter_carrier(carrier)
            .filter(move |c| c.is_in_region(region))
    }

    /// Iterate over all components in the given region
    pub fn iter_region<'a>(
        &'a self,
        region: &'a RegionFilter,
    ) -> impl Iterator<Item = &'a Component> {
        self.iter().filter(move |c| c.is_in_region(region))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, generator};
    use crate::region::RegionMatch;

    #[test]
    fn test_component_kind_labels() {
        assert_eq!(ComponentKind::StorageUnit.to_string(), "storage_units");
        let kind: ComponentKind = toml::Value::from("Storage_Units").try_into().unwrap();
        assert_eq!(kind, ComponentKind::StorageUnit);
    }

    #[test]
    fn test_component_table_insert_duplicate() {
        let mut table = ComponentTable::new(ComponentKind::Generator);
        table.insert(generator("DE1 0 onwind", "onwind", 10.0)).unwrap();
        assert_error!(
            table.insert(generator("DE1 0 onwind", "onwind", 20.0)),
            "Duplicate generators entry: DE1 0 onwind"
        );
    }

    #[test]
    fn test_iter_matching() {
        let mut table = ComponentTable::new(ComponentKind::Generator);
        table.insert(generator("DE1 0 onwind", "onwind", 10.0)).unwrap();
        table.insert(generator("DE1 1 onwind", "onwind", 5.0)).unwrap();
        table.insert(generator("FR1 0 onwind", "onwind", 7.0)).unwrap();
        table.insert(generator("DE1 0 solar", "solar", 3.0)).unwrap();

        let region = RegionFilter::new("DE".into(), RegionMatch::Location);
        let carrier = "onwind".into();
        let names: Vec<_> = table
            .iter_matching(&carrier, &region)
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(names, ["DE1 0 onwind", "DE1 1 onwind"]);
    }

    #[test]
    fn test_set_flows_out_of_order() {
        let mut table = ComponentTable::new(ComponentKind::Link);
        table.set_flows(2, TimeSeries::new(3));
        assert!(table.flows(0).is_some());
        assert_eq!(table.flows(2).unwrap().num_snapshots(), 3);
        assert!(table.flows(3).is_none());
    }
}
