//! Time-integrated energy flows through the ports of components.
//!
//! Raw flows are stored withdrawal positive (see [`PortRole`](crate::network::port::PortRole)),
//! so the wrappers in this module flip signs where needed to report produced energy as positive.
use crate::carrier::CarrierSelection;
use crate::network::Network;
use crate::network::component::{Component, ComponentKind, ComponentTable};
use crate::network::series::weighted_sum;
use crate::region::RegionFilter;
use crate::units::{CONVERSIONS, Energy};
use anyhow::{Context, Result};

/// Get the flow series at `port` for a component.
///
/// Returns `None` if the component has nothing connected at `port` and an error if it does, but
/// there is no flow data for it.
pub(crate) fn port_series<'a>(
    table: &'a ComponentTable,
    component: &Component,
    port: usize,
) -> Result<Option<&'a [f64]>> {
    if component.port(port).is_none() {
        return Ok(None);
    }

    let series = table
        .flows(port)
        .and_then(|flows| flows.get(component.id.as_str()))
        .with_context(|| {
            format!(
                "No flow data for port {port} of {} entry {}",
                table.kind, component.id
            )
        })?;

    Ok(Some(series))
}

/// Snapshot-weighted flow at `port` for a single component, in `MWh`
pub(crate) fn component_flow(
    table: &ComponentTable,
    component: &Component,
    weightings: &[f64],
    port: usize,
) -> Result<f64> {
    Ok(port_series(table, component, port)?
        .map_or(0.0, |series| weighted_sum(series, weightings)))
}

/// The raw energy flowing through `port` of matching components, in `MWh`.
///
/// Each flow series is multiplied by the snapshot weightings and summed. The result keeps the
/// sign convention of the stored data. Components with nothing connected at `port` contribute
/// zero.
pub fn time_integrated_flow(
    table: &ComponentTable,
    carriers: &CarrierSelection,
    region: &RegionFilter,
    weightings: &[f64],
    port: usize,
) -> Result<f64> {
    carriers
        .iter()
        .flat_map(|carrier| table.iter_matching(carrier, region))
        .map(|component| component_flow(table, component, weightings, port))
        .sum()
}

/// Energy drawn by links at `port` (port 0 is the main input), in PJ
pub fn link_input(
    network: &Network,
    carriers: &CarrierSelection,
    region: &RegionFilter,
    port: usize,
) -> Result<Energy> {
    let mwh = time_integrated_flow(
        &network.links,
        carriers,
        region,
        &network.snapshot_weightings,
        port,
    )?;
    Ok(Energy(mwh) * CONVERSIONS.mwh_to_pj)
}

/// Energy delivered by links at output `port` (port 1 is the primary output), in PJ
pub fn link_output(
    network: &Network,
    carriers: &CarrierSelection,
    region: &RegionFilter,
    port: usize,
) -> Result<Energy> {
    Ok(-link_input(network, carriers, region, port)?)
}

/// Energy consumed by loads, in PJ
pub fn load_consumption(
    network: &Network,
    carriers: &CarrierSelection,
    region: &RegionFilter,
) -> Result<Energy> {
    let mwh = time_integrated_flow(
        &network.loads,
        carriers,
        region,
        &network.snapshot_weightings,
        0,
    )?;
    Ok(Energy(mwh) * CONVERSIONS.mwh_to_pj)
}

/// Energy produced by generators, in PJ
pub fn generator_output(
    network: &Network,
    carriers: &CarrierSelection,
    region: &RegionFilter,
) -> Result<Energy> {
    single_port_output(&network.generators, network, carriers, region)
}

/// Net energy discharged by storage units, in PJ
pub fn storage_unit_output(
    network: &Network,
    carriers: &CarrierSelection,
    region: &RegionFilter,
) -> Result<Energy> {
    single_port_output(&network.storage_units, network, carriers, region)
}

fn single_port_output(
    table: &ComponentTable,
    network: &Network,
    carriers: &CarrierSelection,
    region: &RegionFilter,
) -> Result<Energy> {
    let mwh = time_integrated_flow(table, carriers, region, &network.snapshot_weightings, 0)?;
    Ok(-Energy(mwh) * CONVERSIONS.mwh_to_pj)
}

/// Energy through `port`, signed according to the role of each component's port, in PJ.
///
/// Inputs are reported as energy consumed and outputs as energy produced, so the result is
/// positive for normal operation whatever the port.
pub fn flow(
    network: &Network,
    kind: ComponentKind,
    carriers: &CarrierSelection,
    region: &RegionFilter,
    port: usize,
) -> Result<Energy> {
    let table = network.table(kind);
    let mut mwh = 0.0;
    for component in carriers
        .iter()
        .flat_map(|carrier| table.iter_matching(carrier, region))
    {
        let Some(role) = component.port(port).map(|p| p.role) else {
            continue;
        };
        let raw = component_flow(table, component, &network.snapshot_weightings, port)?;
        mwh += role.sign() * raw;
    }

    Ok(Energy(mwh) * CONVERSIONS.mwh_to_pj)
}
