//! The aggregation engine.
//!
//! Every function in this module reduces part of a [`Network`](crate::network::Network) to a
//! single physical quantity by filtering on carrier and region, weighting by snapshot duration and
//! summing. Functions accepting a [`CarrierSelection`](crate::carrier::CarrierSelection) return
//! the sum of the quantity over each carrier in the selection.
//!
//! None of these functions modify their inputs, so they can be called in any order.
pub mod capacity;
pub use capacity::{capacity, capacity_at_port, reservoir_capacity, transmission_capacity};
pub mod emissions;
pub use emissions::{co2_flow, emitting_carriers, total_co2};
pub mod flow;
pub use flow::{
    flow, generator_output, link_input, link_output, load_consumption, storage_unit_output,
    time_integrated_flow,
};
pub mod price;
pub use price::{nodal_price, weighted_average_price};
pub mod withdrawal;
pub use withdrawal::{bus_supply, bus_withdrawal, total_energy};
