//! Code for loading a solved network from a folder of CSV files.
//!
//! The folder has the following layout:
//!
//! * `snapshots.csv` - snapshot names and weightings
//! * `buses.csv` - bus names and carriers
//! * `<component>.csv` - static data for each kind of component (e.g. `links.csv`)
//! * `<component>-p.csv`, `<component>-p<N>.csv` - flow time series for each port
//! * `buses-marginal_price.csv` - the marginal price at each bus
use super::{input_err_msg, read_csv};
use crate::carrier::CarrierID;
use crate::id::IDLike;
use crate::network::Network;
use crate::network::bus::{Bus, BusID, BusMap};
use crate::network::component::{Component, ComponentKind, ComponentTable};
use crate::network::port::{Port, PortRole};
use crate::network::series::TimeSeries;
use anyhow::{Context, Result, ensure};
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use strum::IntoEnumIterator;

const SNAPSHOTS_FILE_NAME: &str = "snapshots.csv";
const BUSES_FILE_NAME: &str = "buses.csv";
const MARGINAL_PRICE_FILE_NAME: &str = "buses-marginal_price.csv";

/// The name of the index column of time series files
const SNAPSHOT_COLUMN: &str = "snapshot";

#[derive(Deserialize)]
struct SnapshotRaw {
    #[serde(alias = "objective")]
    weightings: f64,
}

#[derive(Deserialize)]
struct BusRaw {
    name: BusID,
    carrier: CarrierID,
    #[serde(default)]
    location: Option<String>,
}

/// A row of a component file, keyed by column name.
///
/// Links have a variable number of ports, so rows can't be read into a fixed struct.
type ComponentRow = HashMap<String, String>;

/// Read a network from the specified folder.
///
/// # Arguments
///
/// * `network_dir` - Folder containing the network CSV files
///
/// # Returns
///
/// The loaded [`Network`], or an error if any file is missing or malformed.
pub fn load_network(network_dir: &Path) -> Result<Network> {
    ensure!(
        network_dir.is_dir(),
        "Network folder {} does not exist",
        network_dir.display()
    );

    let weightings = read_snapshot_weightings(&network_dir.join(SNAPSHOTS_FILE_NAME))?;
    let mut network = Network::new(weightings);
    let num_snapshots = network.num_snapshots();

    network.buses = read_buses(&network_dir.join(BUSES_FILE_NAME))?;

    for kind in ComponentKind::iter() {
        let file_path = network_dir.join(format!("{kind}.csv"));
        if !file_path.is_file() {
            debug!("No {kind} found in {}", network_dir.display());
            continue;
        }

        let mut table = read_component_table(&file_path, kind)?;
        read_component_flows(network_dir, &mut table, num_snapshots)?;
        *network.table_mut(kind) = table;
    }

    let prices_path = network_dir.join(MARGINAL_PRICE_FILE_NAME);
    if prices_path.is_file() {
        let buses = &network.buses;
        network.marginal_prices = read_time_series(&prices_path, num_snapshots, |id| {
            buses.contains_key(id)
        })?;
    }

    network
        .validate_buses()
        .with_context(|| format!("Invalid network in {}", network_dir.display()))?;

    Ok(network)
}

/// Read the weighting (duration in hours) of each snapshot
fn read_snapshot_weightings(file_path: &Path) -> Result<Vec<f64>> {
    let weightings: Vec<f64> = read_csv::<SnapshotRaw>(file_path)?
        .map(|snapshot| snapshot.weightings)
        .collect();
    ensure!(
        weightings.iter().all(|w| *w >= 0.0),
        "{}: Snapshot weightings cannot be negative",
        input_err_msg(file_path)
    );

    Ok(weightings)
}

fn read_buses(file_path: &Path) -> Result<BusMap> {
    let mut buses = BusMap::new();
    for raw in read_csv::<BusRaw>(file_path)? {
        let bus = Bus {
            id: raw.name.clone(),
            carrier: raw.carrier,
            location: raw.location.filter(|loc| !loc.is_empty()),
        };
        ensure!(
            buses.insert(raw.name.clone(), bus).is_none(),
            "{}: Duplicate bus {}",
            input_err_msg(file_path),
            raw.name
        );
    }

    Ok(buses)
}

/// Read the static data for one kind of component
fn read_component_table(file_path: &Path, kind: ComponentKind) -> Result<ComponentTable> {
    let mut table = ComponentTable::new(kind);
    let rows = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?
        .into_deserialize::<ComponentRow>();
    for row in rows {
        let row = row.with_context(|| input_err_msg(file_path))?;
        let component = component_from_row(&row, kind).with_context(|| input_err_msg(file_path))?;
        table
            .insert(component)
            .with_context(|| input_err_msg(file_path))?;
    }

    Ok(table)
}

/// Get a required text field
fn text_field<'a>(row: &'a ComponentRow, column: &str) -> Result<&'a str> {
    row.get(column)
        .map(String::as_str)
        .with_context(|| format!("Missing column: {column}"))
}

/// Get a numeric field, using `default` if the column is missing or the value is empty
fn number_field(row: &ComponentRow, column: &str, default: f64) -> Result<f64> {
    match row.get(column).map(String::as_str) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse()
            .with_context(|| format!("Invalid value for {column}: {value}")),
    }
}

fn component_from_row(row: &ComponentRow, kind: ComponentKind) -> Result<Component> {
    let name = text_field(row, "name")?;
    let ports = if kind.is_multi_port() {
        multi_port_from_row(row, kind)
    } else {
        let bus = text_field(row, "bus")?;
        ensure!(!bus.is_empty(), "No bus given for {name}");
        Ok(vec![Port {
            bus: Some(bus.into()),
            efficiency: 1.0,
            role: kind.single_port_role(),
        }])
    }
    .with_context(|| format!("Invalid ports for {kind} entry {name}"))?;

    let component = Component {
        id: name.into(),
        carrier: row.get("carrier").map_or("", String::as_str).into(),
        location: row.get("location").filter(|loc| !loc.is_empty()).cloned(),
        ports,
        p_nom_opt: number_field(row, "p_nom_opt", 0.0)?,
        e_nom_opt: number_field(row, "e_nom_opt", 0.0)?,
        s_nom_opt: number_field(row, "s_nom_opt", 0.0)?,
        max_hours: number_field(row, "max_hours", 1.0)?,
        length: number_field(row, "length", 0.0)?,
    };

    Ok(component)
}

/// The column holding the efficiency for port `index` of a link
fn efficiency_column(index: usize) -> String {
    match index {
        1 => "efficiency".to_string(),
        n => format!("efficiency{n}"),
    }
}

/// Read the ports of a line or link from columns `bus0`, `bus1`, ...
fn multi_port_from_row(row: &ComponentRow, kind: ComponentKind) -> Result<Vec<Port>> {
    let mut ports = Vec::new();
    for index in 0.. {
        let Some(bus) = row.get(&format!("bus{index}")) else {
            break;
        };

        let port = if kind == ComponentKind::Line {
            Port {
                bus: Some(bus.as_str().into()),
                efficiency: 1.0,
                role: if index == 0 {
                    PortRole::Input
                } else {
                    PortRole::PrimaryOutput
                },
            }
        } else {
            let efficiency = if index == 0 {
                1.0
            } else {
                number_field(row, &efficiency_column(index), 1.0)?
            };
            Port {
                bus: (!bus.is_empty()).then(|| bus.as_str().into()),
                efficiency,
                role: PortRole::for_link_port(index, efficiency),
            }
        };
        ports.push(port);
    }

    ensure!(
        ports.len() >= 2 && ports.iter().take(2).all(|p| p.bus.is_some()),
        "bus0 and bus1 must be given"
    );
    if kind == ComponentKind::Line {
        ensure!(ports.len() == 2, "Lines must have exactly two buses");
    }

    Ok(ports)
}

/// The time series file holding flows at `port` for the given kind of component
fn flows_file_name(kind: ComponentKind, port: usize) -> String {
    if kind.is_multi_port() {
        format!("{kind}-p{port}.csv")
    } else {
        format!("{kind}-p.csv")
    }
}

/// Read the flow time series for every port of a table's components
fn read_component_flows(
    network_dir: &Path,
    table: &mut ComponentTable,
    num_snapshots: usize,
) -> Result<()> {
    let num_ports = table.iter().map(|c| c.ports.len()).max().unwrap_or(0);
    for port in 0..num_ports {
        let file_path = network_dir.join(flows_file_name(table.kind, port));
        if !file_path.is_file() {
            continue;
        }

        let series = read_time_series(&file_path, num_snapshots, |id| table.get(id).is_some())?;
        table.set_flows(port, series);
    }

    Ok(())
}

/// Read a wide time series file, with a `snapshot` column followed by one column per ID.
///
/// `is_known` is used to check that each column corresponds to a known ID.
fn read_time_series<ID, F>(
    file_path: &Path,
    num_snapshots: usize,
    is_known: F,
) -> Result<TimeSeries<ID>>
where
    ID: IDLike,
    F: Fn(&str) -> bool,
{
    read_time_series_internal(file_path, num_snapshots, is_known)
        .with_context(|| input_err_msg(file_path))
}

fn read_time_series_internal<ID, F>(
    file_path: &Path,
    num_snapshots: usize,
    is_known: F,
) -> Result<TimeSeries<ID>>
where
    ID: IDLike,
    F: Fn(&str) -> bool,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)?;
    let headers = reader.headers()?.clone();
    ensure!(
        headers.get(0) == Some(SNAPSHOT_COLUMN),
        "First column must be {SNAPSHOT_COLUMN}"
    );

    let names: Vec<&str> = headers.iter().skip(1).collect();
    for name in &names {
        ensure!(is_known(name), "Unknown entry {name}");
    }

    let mut columns = vec![Vec::with_capacity(num_snapshots); names.len()];
    for record in reader.records() {
        let record = record?;
        let values = names.iter().zip(record.iter().skip(1));
        for (column, (name, value)) in columns.iter_mut().zip(values) {
            let value: f64 = value
                .parse()
                .with_context(|| format!("Invalid value for {name}: {value}"))?;
            column.push(value);
        }
    }

    let mut series = TimeSeries::new(num_snapshots);
    for (name, values) in names.into_iter().zip(columns) {
        series.insert(ID::from(name.to_string()), values)?;
    }

    Ok(series)
}
