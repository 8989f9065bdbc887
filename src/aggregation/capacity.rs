//! Installed capacities of generation, conversion, storage and transmission assets.
use crate::carrier::{CarrierID, CarrierSelection};
use crate::network::Network;
use crate::network::component::{Component, ComponentKind, ComponentTable};
use crate::region::RegionFilter;
use crate::units::{CONVERSIONS, Capacity, StorageEnergy, TransmissionCapacity};
use anyhow::{Result, bail, ensure};
use log::debug;

/// The carrier of DC links, which count towards transmission capacity
const DC_CARRIER: &str = "DC";

/// Suffix for the duplicate representation of bidirectional links
const REVERSED_SUFFIX: &str = "-reversed";

/// Installed capacity, expressed on the output side of the asset.
///
/// For links, the nominal (input) capacity is multiplied by the efficiency of the primary output
/// (port 1). For generators and storage units the nominal capacity is used as-is. For CHPs, this
/// is therefore the electrical capacity; use [`capacity_at_port`] for the heat side.
///
/// # Returns
///
/// The capacity in GW, or an error if `table` holds components without a power capacity.
pub fn capacity(
    table: &ComponentTable,
    carriers: &CarrierSelection,
    region: &RegionFilter,
) -> Result<Capacity> {
    match table.kind {
        ComponentKind::Link => capacity_at_port(table, carriers, region, 1),
        ComponentKind::Generator | ComponentKind::StorageUnit => Ok(carriers
            .iter()
            .map(|carrier| {
                let p_nom: f64 = table
                    .iter_matching(carrier, region)
                    .map(|c| c.p_nom_opt)
                    .sum();
                Capacity(p_nom) * CONVERSIONS.mw_to_gw
            })
            .sum()),
        kind => bail!(
            "Cannot calculate capacity for {kind}: expected links, generators or storage units"
        ),
    }
}

/// Installed capacity of links, scaled by the efficiency of the given output port.
///
/// Links which have nothing connected at `port` do not contribute.
pub fn capacity_at_port(
    table: &ComponentTable,
    carriers: &CarrierSelection,
    region: &RegionFilter,
    port: usize,
) -> Result<Capacity> {
    ensure!(
        table.kind == ComponentKind::Link,
        "Cannot calculate capacity at port {port} for {}: only links have multiple ports",
        table.kind
    );
    ensure!(port > 0, "Port 0 is the input of a link and has no efficiency");

    Ok(carriers
        .iter()
        .map(|carrier| link_capacity_at_port(table, carrier, region, port))
        .sum())
}

fn link_capacity_at_port(
    table: &ComponentTable,
    carrier: &CarrierID,
    region: &RegionFilter,
    port: usize,
) -> Capacity {
    if port == 1 && carrier.as_str().contains("CHP") {
        debug!("Returning electrical capacity of {carrier}, not thermal");
    }

    let p_nom: f64 = table
        .iter_matching(carrier, region)
        .filter_map(|c| c.port(port).map(|p| c.p_nom_opt * p.efficiency))
        .sum();
    Capacity(p_nom) * CONVERSIONS.mw_to_gw
}

/// Energy storage capacity.
///
/// For stores this is the nominal energy. For storage units it is nominal power multiplied by the
/// maximum number of hours of storage.
///
/// # Returns
///
/// The capacity in `GWh`, or an error if `table` holds components which cannot store energy.
pub fn reservoir_capacity(
    table: &ComponentTable,
    carriers: &CarrierSelection,
    region: &RegionFilter,
) -> Result<StorageEnergy> {
    let energy: fn(&Component) -> f64 = match table.kind {
        ComponentKind::Store => |c| c.e_nom_opt,
        ComponentKind::StorageUnit => |c| c.p_nom_opt * c.max_hours,
        kind => bail!(
            "Cannot calculate reservoir capacity for {kind}: expected stores or storage units"
        ),
    };

    Ok(carriers
        .iter()
        .map(|carrier| {
            let e_nom: f64 = table.iter_matching(carrier, region).map(energy).sum();
            StorageEnergy(e_nom) * CONVERSIONS.mw_to_gw
        })
        .sum())
}

/// Length-weighted capacity of AC lines and DC links touching the region.
///
/// Each end of a line inside the region counts for half, so a line inside the region is counted
/// once and a line crossing its border is counted half. The reversed copies of DC links are
/// skipped.
pub fn transmission_capacity(network: &Network, region: &RegionFilter) -> TransmissionCapacity {
    let share = |component: &Component| -> f64 {
        component
            .ports
            .iter()
            .take(2)
            .filter_map(|p| p.bus.as_ref())
            .filter(|bus| network.is_bus_in_region(bus.as_str(), region))
            .map(|_| 0.5)
            .sum()
    };

    let ac: f64 = network
        .lines
        .iter()
        .map(|line| share(line) * line.length * line.s_nom_opt)
        .sum();

    let dc: f64 = network
        .links
        .iter()
        .filter(|link| {
            link.carrier.as_str() == DC_CARRIER && !link.id.as_str().contains(REVERSED_SUFFIX)
        })
        .map(|link| share(link) * link.length * link.p_nom_opt)
        .sum();

    TransmissionCapacity(ac + dc) * CONVERSIONS.mw_to_gw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_approx_eq, assert_error, gas_wind_network, region_x};
    use rstest::rstest;

    #[rstest]
    fn test_capacity_link_uses_efficiency(gas_wind_network: Network, region_x: RegionFilter) {
        // 100 MW of gas input at 50% efficiency
        let cap = capacity(&gas_wind_network.links, &"gas".into(), &region_x).unwrap();
        assert_approx_eq!(cap.value(), 0.05);
    }

    #[rstest]
    fn test_capacity_generator(gas_wind_network: Network, region_x: RegionFilter) {
        let cap = capacity(&gas_wind_network.generators, &"wind".into(), &region_x).unwrap();
        assert_approx_eq!(cap.value(), 0.04);
    }

    #[rstest]
    fn test_capacity_list_is_sum(gas_wind_network: Network, region_x: RegionFilter) {
        let links = &gas_wind_network.links;
        let both = capacity(links, &["gas", "urban central gas CHP"].into(), &region_x).unwrap();
        let gas = capacity(links, &"gas".into(), &region_x).unwrap();
        let chp = capacity(links, &"urban central gas CHP".into(), &region_x).unwrap();
        assert_approx_eq!(both.value(), (gas + chp).value());
    }

    #[rstest]
    fn test_capacity_missing_carrier_is_zero(gas_wind_network: Network, region_x: RegionFilter) {
        let cap = capacity(&gas_wind_network.links, &"nuclear".into(), &region_x).unwrap();
        assert_eq!(cap, Capacity(0.0));
        let cap = reservoir_capacity(&gas_wind_network.stores, &"H2".into(), &region_x).unwrap();
        assert_eq!(cap, StorageEnergy(0.0));
    }

    #[rstest]
    fn test_capacity_invalid_table(gas_wind_network: Network, region_x: RegionFilter) {
        assert_error!(
            capacity(&gas_wind_network.stores, &"battery".into(), &region_x),
            "Cannot calculate capacity for stores: expected links, generators or storage units"
        );
        // Fails even if no carriers are selected
        let nothing = CarrierSelection::List(vec![]);
        assert!(capacity(&gas_wind_network.loads, &nothing, &region_x).is_err());
    }

    #[rstest]
    fn test_capacity_at_port(gas_wind_network: Network, region_x: RegionFilter) {
        let links = &gas_wind_network.links;
        let carrier = "urban central gas CHP".into();
        let heat = capacity_at_port(links, &carrier, &region_x, 2).unwrap();
        assert_approx_eq!(heat.value(), 20.0 * 0.45 * 1e-3);

        // The gas power plant has no output at port 3
        let none = capacity_at_port(links, &"gas".into(), &region_x, 3).unwrap();
        assert_eq!(none, Capacity(0.0));

        assert_error!(
            capacity_at_port(&gas_wind_network.generators, &"wind".into(), &region_x, 2),
            "Cannot calculate capacity at port 2 for generators: only links have multiple ports"
        );
        assert!(capacity_at_port(links, &carrier, &region_x, 0).is_err());
    }

    #[rstest]
    fn test_reservoir_capacity(gas_wind_network: Network, region_x: RegionFilter) {
        let store = reservoir_capacity(&gas_wind_network.stores, &"battery".into(), &region_x);
        assert_approx_eq!(store.unwrap().value(), 0.2);

        // 30 MW for 6 hours
        let phs = reservoir_capacity(&gas_wind_network.storage_units, &"PHS".into(), &region_x);
        assert_approx_eq!(phs.unwrap().value(), 0.18);

        assert_error!(
            reservoir_capacity(&gas_wind_network.links, &"gas".into(), &region_x),
            "Cannot calculate reservoir capacity for links: expected stores or storage units"
        );
    }

    #[rstest]
    fn test_transmission_capacity(gas_wind_network: Network, region_x: RegionFilter) {
        // Line 1 crosses the border (half of 100 MW * 200 km), line 2 is internal
        // (50 MW * 100 km) and the DC link crosses the border (half of 40 MW * 300 km)
        let expected = (0.5 * 100.0 * 200.0 + 50.0 * 100.0 + 0.5 * 40.0 * 300.0) * 1e-3;
        let cap = transmission_capacity(&gas_wind_network, &region_x);
        assert_approx_eq!(cap.value(), expected);
    }
}
