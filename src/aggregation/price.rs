//! Flow-weighted average prices.
use super::withdrawal::bus_withdrawal;
use crate::carrier::CarrierID;
use crate::network::Network;
use crate::network::bus::BusID;
use crate::network::series::TimeSeries;
use crate::region::RegionFilter;
use crate::units::{CONVERSIONS, MoneyPerEnergy};
use anyhow::{Context, Result};
use float_cmp::approx_eq;

/// The average of `prices` weighted by `flows`, i.e. Σ(flow × price) / Σ(flow).
///
/// Every bus in `flows` must have a price series. If the total flow is zero there is no
/// meaningful price and NaN is returned.
pub fn weighted_average_price(
    flows: &TimeSeries<BusID>,
    prices: &TimeSeries<BusID>,
) -> Result<f64> {
    let mut cost = 0.0;
    let mut total_flow = 0.0;
    for (bus, values) in flows.iter() {
        let bus_prices = prices
            .get(bus.as_str())
            .with_context(|| format!("No marginal price found for bus {bus}"))?;
        for (flow, price) in values.iter().zip(bus_prices) {
            cost += flow * price;
            total_flow += flow;
        }
    }

    if approx_eq!(f64, total_flow, 0.0) {
        return Ok(f64::NAN);
    }

    Ok(cost / total_flow)
}

/// The average marginal price paid for withdrawals from buses with the given carrier, per GJ.
///
/// Components with carriers containing any of the `exclude` patterns are left out of the
/// weighting.
pub fn nodal_price(
    network: &Network,
    bus_carrier: &CarrierID,
    region: &RegionFilter,
    exclude: &[String],
) -> Result<MoneyPerEnergy> {
    let withdrawal = bus_withdrawal(network, bus_carrier, region, exclude)?;
    let per_mwh = weighted_average_price(&withdrawal, &network.marginal_prices)?;
    Ok(MoneyPerEnergy(per_mwh / CONVERSIONS.mwh_to_gj))
}
