//! Fixtures for tests
use crate::network::Network;
use crate::network::bus::{Bus, BusID};
use crate::network::component::{Component, ComponentID, ComponentKind, ComponentTable};
use crate::network::port::{Port, PortRole};
use crate::network::series::TimeSeries;
use crate::region::{RegionFilter, RegionMatch};
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// Assert that two floats are approximately equal
macro_rules! assert_approx_eq {
    ($a:expr, $b:expr) => {{
        let (a, b): (f64, f64) = ($a, $b);
        assert!(
            float_cmp::approx_eq!(f64, a, b, epsilon = 1e-12, ulps = 4),
            "{a} is not approximately equal to {b}"
        );
    }};
}
pub(crate) use assert_approx_eq;

/// Get the first two whitespace-separated tokens of a name (e.g. "DE1 0")
fn node_of(name: &str) -> String {
    name.split_whitespace().take(2).collect::<Vec<_>>().join(" ")
}

/// A component with no ports and all attributes zeroed
fn component(name: &str, carrier: &str) -> Component {
    Component {
        id: name.into(),
        carrier: carrier.into(),
        location: None,
        ports: Vec::new(),
        p_nom_opt: 0.0,
        e_nom_opt: 0.0,
        s_nom_opt: 0.0,
        max_hours: 0.0,
        length: 0.0,
    }
}

/// A single port connected to the bus given by the first two tokens of `name`
fn single_port(name: &str, kind: ComponentKind) -> Vec<Port> {
    vec![Port {
        bus: Some(node_of(name).into()),
        efficiency: 1.0,
        role: kind.single_port_role(),
    }]
}

/// Create a generator connected to the node embedded in its name
pub fn generator(name: &str, carrier: &str, p_nom_opt: f64) -> Component {
    Component {
        ports: single_port(name, ComponentKind::Generator),
        p_nom_opt,
        ..component(name, carrier)
    }
}

/// Create a storage unit connected to the node embedded in its name
pub fn storage_unit(name: &str, carrier: &str, p_nom_opt: f64, max_hours: f64) -> Component {
    Component {
        ports: single_port(name, ComponentKind::StorageUnit),
        p_nom_opt,
        max_hours,
        ..component(name, carrier)
    }
}

/// Create a store connected to the node embedded in its name
pub fn store(name: &str, carrier: &str, e_nom_opt: f64) -> Component {
    Component {
        ports: single_port(name, ComponentKind::Store),
        e_nom_opt,
        ..component(name, carrier)
    }
}

/// Create a load connected to the given bus
pub fn load(name: &str, carrier: &str, bus: &str) -> Component {
    Component {
        ports: vec![Port {
            bus: Some(bus.into()),
            efficiency: 1.0,
            role: PortRole::Input,
        }],
        ..component(name, carrier)
    }
}

/// Create a link from a list of (bus, efficiency) pairs. The efficiency of port 0 is ignored.
pub fn link(name: &str, carrier: &str, p_nom_opt: f64, ports: &[(&str, f64)]) -> Component {
    let ports = ports
        .iter()
        .enumerate()
        .map(|(i, &(bus, efficiency))| {
            let efficiency = if i == 0 { 1.0 } else { efficiency };
            Port {
                bus: Some(bus.into()),
                efficiency,
                role: PortRole::for_link_port(i, efficiency),
            }
        })
        .collect();

    Component {
        ports,
        p_nom_opt,
        ..component(name, carrier)
    }
}

/// Create an AC line
pub fn line(name: &str, bus0: &str, bus1: &str, s_nom_opt: f64, length: f64) -> Component {
    Component {
        ports: vec![
            Port {
                bus: Some(bus0.into()),
                efficiency: 1.0,
                role: PortRole::Input,
            },
            Port {
                bus: Some(bus1.into()),
                efficiency: 1.0,
                role: PortRole::PrimaryOutput,
            },
        ],
        s_nom_opt,
        length,
        ..component(name, "AC")
    }
}

/// Build a time series from (name, values) pairs
pub fn series<ID>(num_snapshots: usize, columns: &[(&str, &[f64])]) -> TimeSeries<ID>
where
    ID: crate::id::IDLike,
{
    let mut series = TimeSeries::new(num_snapshots);
    for (id, values) in columns {
        series
            .insert(ID::from((*id).to_string()), values.to_vec())
            .unwrap();
    }
    series
}

/// Build a table of components along with flow series for each port.
///
/// `flows[port]` contains the (name, values) pairs for that port.
pub fn table(
    kind: ComponentKind,
    components: Vec<Component>,
    num_snapshots: usize,
    flows: &[&[(&str, &[f64])]],
) -> ComponentTable {
    let mut table = ComponentTable::new(kind);
    for component in components {
        table.insert(component).unwrap();
    }
    for (port, columns) in flows.iter().enumerate() {
        table.set_flows(port, series::<ComponentID>(num_snapshots, columns));
    }
    table
}

fn bus(name: &str, carrier: &str) -> (BusID, Bus) {
    (
        name.into(),
        Bus {
            id: name.into(),
            carrier: carrier.into(),
            location: None,
        },
    )
}

#[fixture]
pub fn region_x() -> RegionFilter {
    RegionFilter::new("X".into(), RegionMatch::Location)
}

/// A small network with a single snapshot of weight 1.0.
///
/// Region X contains a gas power plant (100 MW fuel input, 50% efficient) which burns 80 `MWh` of
/// gas, a 40 MW wind farm generating 40 `MWh`, a gas CHP, direct air capture, storage and a load.
/// Region Y contains a second wind farm. Lines and DC links connect the two regions.
#[fixture]
pub fn gas_wind_network() -> Network {
    let mut network = Network::new(vec![1.0]);
    network.buses = [
        bus("X1 0", "AC"),
        bus("X1 1", "AC"),
        bus("Y1 0", "AC"),
        bus("X1 0 gas", "gas"),
        bus("X1 0 urban central heat", "urban central heat"),
        bus("co2 atmosphere", "co2"),
        bus("co2 stored", "co2 stored"),
    ]
    .into_iter()
    .collect();
    network.marginal_prices = series(1, &[("X1 0", &[50.0]), ("Y1 0", &[30.0])]);

    network.generators = table(
        ComponentKind::Generator,
        vec![
            generator("X1 0 wind", "wind", 40.0),
            generator("Y1 0 wind", "wind", 10.0),
        ],
        1,
        &[&[("X1 0 wind", &[-40.0]), ("Y1 0 wind", &[-10.0])]],
    );
    network.storage_units = table(
        ComponentKind::StorageUnit,
        vec![storage_unit("X1 0 PHS", "PHS", 30.0, 6.0)],
        1,
        &[&[("X1 0 PHS", &[-5.0])]],
    );
    network.stores = table(
        ComponentKind::Store,
        vec![store("X1 0 battery", "battery", 200.0)],
        1,
        &[&[("X1 0 battery", &[0.0])]],
    );
    network.loads = table(
        ComponentKind::Load,
        vec![load("X1 0 load", "electricity", "X1 0")],
        1,
        &[&[("X1 0 load", &[40.0])]],
    );
    network.links = table(
        ComponentKind::Link,
        vec![
            link(
                "X1 0 gas CCGT",
                "gas",
                100.0,
                &[("X1 0 gas", 1.0), ("X1 0", 0.5), ("co2 atmosphere", 0.2)],
            ),
            link(
                "X1 0 urban central gas CHP",
                "urban central gas CHP",
                20.0,
                &[
                    ("X1 0 gas", 1.0),
                    ("X1 0", 0.4),
                    ("X1 0 urban central heat", 0.45),
                    ("co2 atmosphere", 0.2),
                ],
            ),
            link(
                "X1 0 DAC",
                "DAC",
                5.0,
                &[("co2 atmosphere", 1.0), ("co2 stored", 1.0), ("X1 0", -0.1)],
            ),
            Component {
                length: 300.0,
                ..link("DC X-Y", "DC", 40.0, &[("X1 0", 1.0), ("Y1 0", 1.0)])
            },
            Component {
                length: 300.0,
                ..link("DC X-Y-reversed", "DC", 40.0, &[("Y1 0", 1.0), ("X1 0", 1.0)])
            },
        ],
        1,
        &[
            &[
                ("X1 0 gas CCGT", &[80.0]),
                ("X1 0 urban central gas CHP", &[10.0]),
                ("X1 0 DAC", &[3.0]),
                ("DC X-Y", &[0.0]),
                ("DC X-Y-reversed", &[0.0]),
            ],
            &[
                ("X1 0 gas CCGT", &[-40.0]),
                ("X1 0 urban central gas CHP", &[-4.0]),
                ("X1 0 DAC", &[-3.0]),
                ("DC X-Y", &[0.0]),
                ("DC X-Y-reversed", &[0.0]),
            ],
            &[
                ("X1 0 gas CCGT", &[-16.0]),
                ("X1 0 urban central gas CHP", &[-4.5]),
                ("X1 0 DAC", &[0.3]),
            ],
            &[("X1 0 urban central gas CHP", &[-2.0])],
        ],
    );
    network.lines = table(
        ComponentKind::Line,
        vec![
            line("1", "X1 0", "Y1 0", 100.0, 200.0),
            line("2", "X1 0", "X1 1", 50.0, 100.0),
        ],
        1,
        &[],
    );

    network
}
