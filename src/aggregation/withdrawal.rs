//! Energy withdrawn from and supplied to buses of a given carrier.
use super::flow::port_series;
use crate::carrier::CarrierID;
use crate::network::Network;
use crate::network::bus::BusID;
use crate::network::component::ComponentKind;
use crate::network::series::TimeSeries;
use crate::region::RegionFilter;
use crate::units::{CONVERSIONS, Energy};
use anyhow::Result;
use indexmap::IndexMap;
use strum::IntoEnumIterator;

#[derive(Clone, Copy)]
enum Direction {
    Withdrawal,
    Supply,
}

impl Direction {
    /// The amount of a raw flow going in this direction (always non-negative)
    fn part(self, value: f64) -> f64 {
        match self {
            Self::Withdrawal => value.max(0.0),
            Self::Supply => (-value).max(0.0),
        }
    }
}

/// Energy withdrawn from each bus with the given carrier in the region.
///
/// The positive part of every port flow at a matching bus is weighted by snapshot duration and
/// summed per bus, giving energy in `MWh` for each bus and snapshot. Lines are not included, nor
/// are components whose carrier contains any of the `exclude` patterns.
pub fn bus_withdrawal(
    network: &Network,
    bus_carrier: &CarrierID,
    region: &RegionFilter,
    exclude: &[String],
) -> Result<TimeSeries<BusID>> {
    bus_energy(network, bus_carrier, region, exclude, Direction::Withdrawal)
}

/// Energy supplied to each bus with the given carrier in the region.
///
/// This mirrors [`bus_withdrawal`], but uses the negative part of each flow, reported as a
/// positive amount.
pub fn bus_supply(
    network: &Network,
    bus_carrier: &CarrierID,
    region: &RegionFilter,
    exclude: &[String],
) -> Result<TimeSeries<BusID>> {
    bus_energy(network, bus_carrier, region, exclude, Direction::Supply)
}

fn bus_energy(
    network: &Network,
    bus_carrier: &CarrierID,
    region: &RegionFilter,
    exclude: &[String],
    direction: Direction,
) -> Result<TimeSeries<BusID>> {
    let weightings = &network.snapshot_weightings;
    let is_excluded =
        |carrier: &CarrierID| exclude.iter().any(|p| carrier.as_str().contains(p.as_str()));

    let mut per_bus: IndexMap<BusID, Vec<f64>> = IndexMap::new();
    for kind in ComponentKind::iter().filter(|&kind| kind != ComponentKind::Line) {
        let table = network.table(kind);
        for component in table.iter().filter(|c| !is_excluded(&c.carrier)) {
            for (index, port) in component.ports.iter().enumerate() {
                let Some(bus) = &port.bus else {
                    continue;
                };
                let at_carrier = network
                    .buses
                    .get(bus)
                    .is_some_and(|b| &b.carrier == bus_carrier);
                if !at_carrier || !network.is_bus_in_region(bus.as_str(), region) {
                    continue;
                }

                let Some(series) = port_series(table, component, index)? else {
                    continue;
                };
                let energy = per_bus
                    .entry(bus.clone())
                    .or_insert_with(|| vec![0.0; weightings.len()]);
                for ((total, value), weight) in energy.iter_mut().zip(series).zip(weightings) {
                    *total += direction.part(*value) * weight;
                }
            }
        }
    }

    let mut energy = TimeSeries::new(network.num_snapshots());
    for (bus, values) in per_bus {
        energy.insert(bus, values)?;
    }

    Ok(energy)
}

/// The total energy over all buses and snapshots, in PJ
pub fn total_energy(energy: &TimeSeries<BusID>) -> Energy {
    let mwh: f64 = energy.iter().flat_map(|(_, values)| values).sum();
    Energy(mwh) * CONVERSIONS.mwh_to_pj
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_approx_eq, gas_wind_network, region_x};
    use rstest::rstest;

    #[rstest]
    fn test_bus_withdrawal(gas_wind_network: Network, region_x: RegionFilter) {
        // The load draws 40 MWh at X1 0 and DAC draws 0.3 MWh
        let withdrawal = bus_withdrawal(&gas_wind_network, &"AC".into(), &region_x, &[]).unwrap();
        assert_approx_eq!(withdrawal.get("X1 0").unwrap()[0], 40.3);
        assert_eq!(withdrawal.get("Y1 0"), None);

        let excluded = bus_withdrawal(
            &gas_wind_network,
            &"AC".into(),
            &region_x,
            &["DAC".to_string()],
        )
        .unwrap();
        assert_approx_eq!(total_energy(&excluded).value(), 40.0 * 3.6e-6);
    }

    #[rstest]
    fn test_bus_supply(gas_wind_network: Network, region_x: RegionFilter) {
        // Wind 40, PHS 5, gas power plant 40 and CHP 4
        let supply = bus_supply(&gas_wind_network, &"AC".into(), &region_x, &[]).unwrap();
        assert_approx_eq!(supply.get("X1 0").unwrap()[0], 89.0);
    }

    #[rstest]
    fn test_bus_withdrawal_no_matching_buses(gas_wind_network: Network, region_x: RegionFilter) {
        let withdrawal = bus_withdrawal(&gas_wind_network, &"H2".into(), &region_x, &[]).unwrap();
        assert_eq!(withdrawal.iter().count(), 0);
        assert_eq!(total_energy(&withdrawal), Energy(0.0));
    }
}
