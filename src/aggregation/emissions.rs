//! CO2 accounting via flows into and out of the atmosphere bus.
//!
//! Emissions are the flows injected into [`ATMOSPHERE_BUS`] by links, so a positive result means
//! CO2 released and a negative result means CO2 removed (e.g. by direct air capture).
use super::flow::component_flow;
use crate::carrier::{CarrierID, CarrierSelection};
use crate::network::Network;
use crate::network::bus::ATMOSPHERE_BUS;
use crate::network::component::{Component, ComponentTable};
use crate::region::RegionFilter;
use crate::units::{CONVERSIONS, Mass};
use anyhow::{Result, ensure};
use indexmap::IndexSet;
use itertools::Itertools;
use log::warn;

/// Indexes of the ports of a component which are connected to the atmosphere
fn atmosphere_ports(component: &Component) -> Vec<usize> {
    component
        .ports
        .iter()
        .enumerate()
        .filter(|(_, port)| port.is_connected_to(ATMOSPHERE_BUS))
        .map(|(index, _)| index)
        .collect()
}

/// Get the ports at which links with the given carrier are connected to the atmosphere.
///
/// All links sharing a carrier must be wired identically. Returns `None` if there are no links
/// with this carrier in the network.
fn carrier_atmosphere_ports(
    links: &ComponentTable,
    carrier: &CarrierID,
) -> Result<Option<Vec<usize>>> {
    let mut rows = links.iter_carrier(carrier);
    let Some(first) = rows.next() else {
        return Ok(None);
    };

    let ports = atmosphere_ports(first);
    ensure!(
        !ports.is_empty(),
        "Links with carrier {carrier} are not connected to {ATMOSPHERE_BUS}"
    );
    for other in rows {
        let other_ports = atmosphere_ports(other);
        ensure!(
            other_ports == ports,
            "Links with carrier {carrier} are connected to {ATMOSPHERE_BUS} at different ports: \
            {} uses port(s) {} but {} uses port(s) {}",
            first.id,
            ports.iter().join(", "),
            other.id,
            other_ports.iter().join(", ")
        );
    }

    Ok(Some(ports))
}

/// Net CO2 emitted by links with the given carriers, in Mt.
///
/// Carriers without any links in the network (e.g. technologies which were not built) contribute
/// zero with a warning.
pub fn co2_flow(
    network: &Network,
    carriers: &CarrierSelection,
    region: &RegionFilter,
) -> Result<Mass> {
    let links = &network.links;
    let mut tonnes = 0.0;
    for carrier in carriers.iter() {
        let Some(ports) = carrier_atmosphere_ports(links, carrier)? else {
            warn!("No links with carrier {carrier} found. Assuming zero emissions.");
            continue;
        };

        for link in links.iter_matching(carrier, region) {
            for &port in &ports {
                tonnes -= component_flow(links, link, &network.snapshot_weightings, port)?;
            }
        }
    }

    Ok(Mass(tonnes) * CONVERSIONS.t_to_mt)
}

/// Net CO2 emitted by all links in the region, in Mt.
///
/// Every port of every link connected to the atmosphere is included, regardless of carrier.
pub fn total_co2(network: &Network, region: &RegionFilter) -> Result<Mass> {
    let links = &network.links;
    let mut tonnes = 0.0;
    for link in links.iter_region(region) {
        for port in atmosphere_ports(link) {
            tonnes -= component_flow(links, link, &network.snapshot_weightings, port)?;
        }
    }

    Ok(Mass(tonnes) * CONVERSIONS.t_to_mt)
}

/// The carriers of all links connected to the atmosphere, in order of first appearance
pub fn emitting_carriers(network: &Network) -> IndexSet<CarrierID> {
    network
        .links
        .iter()
        .filter(|link| !atmosphere_ports(link).is_empty())
        .map(|link| link.carrier.clone())
        .collect()
}
