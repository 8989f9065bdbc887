//! Compute the variables of a report definition for one region of a network.
use crate::aggregation::{
    bus_supply, bus_withdrawal, capacity, capacity_at_port, co2_flow, flow, generator_output,
    link_input, link_output, load_consumption, nodal_price, reservoir_capacity,
    storage_unit_output, total_co2, total_energy, transmission_capacity,
};
use crate::carrier::{CarrierSelection, carriers_containing};
use crate::definition::{Definition, Query, Term, VariableDefinition};
use crate::network::Network;
use crate::region::RegionFilter;
use crate::table::TableMap;
use crate::variable::{VariableMap, VariableName};
use anyhow::{Context, Result, bail, ensure};
use float_cmp::approx_eq;
use indexmap::IndexMap;
use itertools::Itertools;
use log::debug;

/// The data a report is built from for a single year
#[derive(Clone, Copy)]
pub struct ReportInputs<'a> {
    /// The solved network
    pub network: &'a Network,
    /// Auxiliary tables referenced by `table` terms
    pub tables: &'a TableMap,
}

/// Compute every variable in `definition` for a region.
///
/// Children are always evaluated before their parents. Variables which have both terms and
/// children are checked against the sum of their children.
///
/// # Returns
///
/// The value of each variable, in the order they appear in the definition.
pub fn build_variables(
    definition: &Definition,
    inputs: ReportInputs,
    region: &RegionFilter,
) -> Result<VariableMap> {
    debug!("Building {} variables for region {}", definition.len(), region.id);

    let mut values: IndexMap<&VariableName, f64> = IndexMap::new();
    for name in definition.evaluation_order() {
        let Some(variable) = definition.get(name.as_str()) else {
            bail!("Variable {name} is not defined");
        };
        let value = evaluate_variable(variable, &values, inputs, region)
            .with_context(|| format!("Could not calculate {name} for region {}", region.id))?;
        values.insert(name, value);
    }

    Ok(definition
        .iter()
        .map(|variable| (variable.name.clone(), values[&variable.name]))
        .collect())
}

/// Compute a single variable, given the values of its children
fn evaluate_variable(
    variable: &VariableDefinition,
    values: &IndexMap<&VariableName, f64>,
    inputs: ReportInputs,
    region: &RegionFilter,
) -> Result<f64> {
    let children_sum = (!variable.sum_of.is_empty())
        .then(|| variable.sum_of.iter().map(|child| values[child]).sum::<f64>());

    if variable.terms.is_empty() {
        let Some(sum) = children_sum else {
            bail!("Variable {} has no terms or children", variable.name);
        };
        return Ok(sum * variable.scale);
    }

    let mut total = 0.0;
    let mut gross = 0.0;
    for term in &variable.terms {
        let term_value = evaluate_term(term, inputs, region)
            .with_context(|| format!("Could not evaluate {} term", term.query))?;
        total += term_value;
        gross += term_value.abs();
    }
    let value = total * variable.scale;

    if let Some(sum) = children_sum {
        // Relative to the gross magnitude, as terms and children may cancel out (e.g. net-zero
        // emissions)
        let children_gross: f64 = variable.sum_of.iter().map(|child| values[child].abs()).sum();
        let magnitude = (gross * variable.scale.abs())
            .max(children_gross)
            .max(value.abs())
            .max(sum.abs());
        let epsilon = variable.tolerance() * magnitude;
        ensure!(
            approx_eq!(f64, value, sum, epsilon = epsilon),
            "Variable {} is {value}, but the sum of its children ({}) is {sum}",
            variable.name,
            variable.sum_of.iter().join(", ")
        );
    }

    Ok(value)
}

/// Compute the value of a term, including its factor
fn evaluate_term(term: &Term, inputs: ReportInputs, region: &RegionFilter) -> Result<f64> {
    let network = inputs.network;
    let carriers = || select_carriers(term, network);

    let value = match &term.query {
        Query::Capacity { component } => {
            capacity(network.table(*component), &carriers()?, region)?.value()
        }
        Query::CapacityAtPort { port } => {
            capacity_at_port(&network.links, &carriers()?, region, *port)?.value()
        }
        Query::ReservoirCapacity { component } => {
            reservoir_capacity(network.table(*component), &carriers()?, region)?.value()
        }
        Query::TransmissionCapacity => transmission_capacity(network, region).value(),
        Query::LinkInput { port } => link_input(network, &carriers()?, region, *port)?.value(),
        Query::LinkOutput { port } => link_output(network, &carriers()?, region, *port)?.value(),
        Query::Load => load_consumption(network, &carriers()?, region)?.value(),
        Query::GeneratorOutput => generator_output(network, &carriers()?, region)?.value(),
        Query::StorageUnitOutput => storage_unit_output(network, &carriers()?, region)?.value(),
        Query::Flow { component, port } => {
            flow(network, *component, &carriers()?, region, *port)?.value()
        }
        Query::Co2 => co2_flow(network, &carriers()?, region)?.value(),
        Query::TotalCo2 => total_co2(network, region)?.value(),
        Query::BusWithdrawal {
            bus_carrier,
            exclude,
        } => total_energy(&bus_withdrawal(network, bus_carrier, region, exclude)?).value(),
        Query::BusSupply {
            bus_carrier,
            exclude,
        } => total_energy(&bus_supply(network, bus_carrier, region, exclude)?).value(),
        Query::Price {
            bus_carrier,
            exclude,
        } => nodal_price(network, bus_carrier, region, exclude)?.value(),
        Query::Table { table, columns } => inputs
            .tables
            .get(table)
            .with_context(|| format!("No table named {table} was provided"))?
            .sum(columns, region)?
            .value(),
    };

    Ok(term.factor * value)
}

/// Get the carriers a term applies to, resolving patterns against the network
fn select_carriers(term: &Term, network: &Network) -> Result<CarrierSelection> {
    if let Some(carriers) = &term.carriers {
        return Ok(carriers.clone());
    }

    let (Some(kind), Some(pattern)) = (term.query.carrier_table(), &term.carriers_matching) else {
        bail!("No carriers given for {} term", term.query);
    };
    let matching = carriers_containing(network.table(kind).carriers(), pattern);
    if matching.is_empty() {
        debug!("No {kind} have a carrier containing \"{pattern}\"");
    }

    Ok(matching.into())
}
