//! Report definitions describe how each report variable is computed from a network.
//!
//! A definition is a TOML file with a list of `[[variables]]`. Each variable has `terms`, which are
//! queries against the network that are summed, and/or `sum_of`, a list of child variables. If a
//! variable has both, the children are used as a cross-check on the value computed from the
//! terms.
//!
//! The bundled definitions can be listed with the `definition list` command.
use crate::carrier::{CarrierID, CarrierSelection};
use crate::input::{input_err_msg, read_toml};
use crate::network::component::ComponentKind;
use crate::units::{
    Capacity, Energy, Mass, MoneyPerEnergy, StorageEnergy, TransmissionCapacity,
};
use crate::variable::{VariableName, check_variable_name};
use anyhow::{Context, Result, anyhow, bail, ensure};
use include_dir::{Dir, include_dir};
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use petgraph::algo::toposort;
use petgraph::graph::{Graph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The folder containing the bundled report definitions
pub static DEFINITIONS_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/definitions");

/// The name of the bundled definition used if none is specified
pub const DEFAULT_DEFINITION_NAME: &str = "default";

/// The default relative tolerance for checking a variable against the sum of its children
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

fn default_factor() -> f64 {
    1.0
}

fn default_scale() -> f64 {
    1.0
}

fn primary_output() -> usize {
    1
}

/// A quantity computed from the network
#[derive(PartialEq, Debug, Clone, Deserialize, Serialize, strum::Display)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Query {
    /// Installed capacity of links, generators or storage units
    Capacity {
        /// The table to query
        component: ComponentKind,
    },
    /// Installed capacity of links at a secondary output
    CapacityAtPort {
        /// The output port
        port: usize,
    },
    /// Energy capacity of stores or storage units
    ReservoirCapacity {
        /// The table to query
        component: ComponentKind,
    },
    /// Length-weighted capacity of lines and DC links
    TransmissionCapacity,
    /// Energy drawn by links
    LinkInput {
        /// The input port
        #[serde(default)]
        port: usize,
    },
    /// Energy delivered by links
    LinkOutput {
        /// The output port
        #[serde(default = "primary_output")]
        port: usize,
    },
    /// Energy consumed by loads
    Load,
    /// Energy produced by generators
    GeneratorOutput,
    /// Energy discharged by storage units
    StorageUnitOutput,
    /// Energy through a port of any component, signed by the port's role
    Flow {
        /// The table to query
        component: ComponentKind,
        /// The port
        port: usize,
    },
    /// CO2 emitted by links
    Co2,
    /// CO2 emitted by all links in the region
    TotalCo2,
    /// Energy withdrawn from buses with a given carrier
    BusWithdrawal {
        /// The carrier of the buses
        bus_carrier: CarrierID,
        /// Components whose carrier contains any of these are ignored
        #[serde(default)]
        exclude: Vec<String>,
    },
    /// Energy supplied to buses with a given carrier
    BusSupply {
        /// The carrier of the buses
        bus_carrier: CarrierID,
        /// Components whose carrier contains any of these are ignored
        #[serde(default)]
        exclude: Vec<String>,
    },
    /// Average marginal price paid for withdrawals from buses with a given carrier
    Price {
        /// The carrier of the buses
        bus_carrier: CarrierID,
        /// Components whose carrier contains any of these are ignored
        #[serde(default)]
        exclude: Vec<String>,
    },
    /// Sum of columns of an auxiliary table
    Table {
        /// The name of the table, as given in the run configuration
        table: String,
        /// The columns to sum
        columns: Vec<String>,
    },
}

impl Query {
    /// The table whose carriers this query selects from, if it takes carriers
    pub fn carrier_table(&self) -> Option<ComponentKind> {
        match self {
            Self::Capacity { component }
            | Self::ReservoirCapacity { component }
            | Self::Flow { component, .. } => Some(*component),
            Self::CapacityAtPort { .. }
            | Self::LinkInput { .. }
            | Self::LinkOutput { .. }
            | Self::Co2 => Some(ComponentKind::Link),
            Self::Load => Some(ComponentKind::Load),
            Self::GeneratorOutput => Some(ComponentKind::Generator),
            Self::StorageUnitOutput => Some(ComponentKind::StorageUnit),
            Self::TransmissionCapacity
            | Self::TotalCo2
            | Self::BusWithdrawal { .. }
            | Self::BusSupply { .. }
            | Self::Price { .. }
            | Self::Table { .. } => None,
        }
    }

    /// The unit of the values returned by this query
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Capacity { .. } | Self::CapacityAtPort { .. } => Capacity::UNIT,
            Self::ReservoirCapacity { .. } => StorageEnergy::UNIT,
            Self::TransmissionCapacity => TransmissionCapacity::UNIT,
            Self::Co2 | Self::TotalCo2 => Mass::UNIT,
            Self::Price { .. } => MoneyPerEnergy::UNIT,
            _ => Energy::UNIT,
        }
    }

    /// Check that the query's parameters make sense
    fn validate(&self) -> Result<()> {
        match self {
            Self::Capacity { component } => ensure!(
                matches!(
                    component,
                    ComponentKind::Link | ComponentKind::Generator | ComponentKind::StorageUnit
                ),
                "Capacity is only defined for links, generators and storage units, not {component}"
            ),
            Self::ReservoirCapacity { component } => ensure!(
                matches!(component, ComponentKind::Store | ComponentKind::StorageUnit),
                "Reservoir capacity is only defined for stores and storage units, not {component}"
            ),
            Self::CapacityAtPort { port } | Self::LinkOutput { port } => {
                ensure!(*port > 0, "Port 0 is the input of a link, not an output");
            }
            Self::Table { columns, .. } => {
                ensure!(!columns.is_empty(), "No columns given for table");
            }
            _ => {}
        }

        Ok(())
    }
}

/// One summand of a variable
#[derive(PartialEq, Debug, Clone, Deserialize)]
#[serde(try_from = "toml::Table")]
pub struct Term {
    /// What to compute
    pub query: Query,
    /// An explicit selection of carriers
    pub carriers: Option<CarrierSelection>,
    /// Select all carriers of the queried table containing this pattern
    pub carriers_matching: Option<String>,
    /// Multiplier for the value of this term (e.g. -1 to subtract it)
    pub factor: f64,
}

/// The keys of a term which are not part of its query
const TERM_OPTION_KEYS: [&str; 3] = ["carriers", "carriers_matching", "factor"];

/// Options which apply to terms of every kind
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TermOptions {
    #[serde(default)]
    carriers: Option<CarrierSelection>,
    #[serde(default)]
    carriers_matching: Option<String>,
    #[serde(default = "default_factor")]
    factor: f64,
}

impl TryFrom<toml::Table> for Term {
    type Error = anyhow::Error;

    fn try_from(mut table: toml::Table) -> Result<Self> {
        let mut options = toml::Table::new();
        for key in TERM_OPTION_KEYS {
            if let Some(value) = table.remove(key) {
                options.insert(key.to_string(), value);
            }
        }
        let options: TermOptions = toml::Value::Table(options).try_into()?;
        let query: Query = toml::Value::Table(table.clone()).try_into()?;

        // The query's own fields are the only other keys allowed
        let known = toml::Value::try_from(&query)?;
        let unknown = table
            .keys()
            .filter(|key| known.get(key.as_str()).is_none())
            .join(", ");
        ensure!(unknown.is_empty(), "Unknown field(s) in {query} term: {unknown}");

        Ok(Self {
            query,
            carriers: options.carriers,
            carriers_matching: options.carriers_matching,
            factor: options.factor,
        })
    }
}

impl Term {
    fn validate(&self) -> Result<()> {
        self.query.validate()?;
        ensure!(self.factor.is_finite(), "Factor must be a finite number");

        let kind = &self.query;
        match (&self.query.carrier_table(), &self.carriers, &self.carriers_matching) {
            (Some(_), Some(carriers), None) => {
                ensure!(carriers.iter().next().is_some(), "No carriers given for {kind}");
            }
            (Some(_), None, Some(pattern)) => {
                ensure!(!pattern.is_empty(), "carriers_matching cannot be empty");
            }
            (None, None, None) => {}
            (Some(_), None, None) => {
                bail!("{kind} terms need either carriers or carriers_matching")
            }
            (Some(_), Some(_), Some(_)) => {
                bail!("carriers and carriers_matching cannot both be given")
            }
            (None, _, _) => bail!("{kind} terms do not take carriers"),
        }

        Ok(())
    }
}

/// The definition of a single report variable
#[derive(PartialEq, Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableDefinition {
    /// The name of the variable
    pub name: VariableName,
    /// Queries which are summed to give the variable's value
    #[serde(default)]
    pub terms: Vec<Term>,
    /// Child variables which sum to this one
    #[serde(default)]
    pub sum_of: Vec<VariableName>,
    /// A multiplier for the variable's value
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Relative tolerance for checking `terms` against `sum_of`
    pub tolerance: Option<f64>,
}

impl VariableDefinition {
    /// The relative tolerance used when checking this variable against its children
    pub fn tolerance(&self) -> f64 {
        self.tolerance.unwrap_or(DEFAULT_TOLERANCE)
    }

    fn validate(&self) -> Result<()> {
        check_variable_name(self.name.as_str())?;
        ensure!(
            !self.terms.is_empty() || !self.sum_of.is_empty(),
            "Variable must have terms, sum_of or both"
        );
        ensure!(self.scale.is_finite(), "Scale must be a finite number");
        if let Some(tolerance) = self.tolerance {
            ensure!(
                tolerance > 0.0 && tolerance.is_finite(),
                "Tolerance must be a positive number"
            );
        }
        for (i, term) in self.terms.iter().enumerate() {
            term.validate()
                .with_context(|| format!("Invalid term {}", i + 1))?;
        }

        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DefinitionFile {
    variables: Vec<VariableDefinition>,
}

/// A validated set of variable definitions
#[derive(PartialEq, Debug, Clone)]
pub struct Definition {
    variables: IndexMap<VariableName, VariableDefinition>,
    order: Vec<VariableName>,
    units: IndexMap<VariableName, &'static str>,
}

impl Definition {
    /// Create a definition from a list of variables, validating it.
    ///
    /// The variables can be in any order.
    pub fn new(definitions: Vec<VariableDefinition>) -> Result<Self> {
        let mut variables = IndexMap::new();
        for definition in definitions {
            definition
                .validate()
                .with_context(|| format!("Invalid definition for variable {}", definition.name))?;
            let name = definition.name.clone();
            ensure!(
                variables.insert(name.clone(), definition).is_none(),
                "Duplicate variable: {name}"
            );
        }

        for definition in variables.values() {
            for child in &definition.sum_of {
                ensure!(
                    variables.contains_key(child),
                    "Variable {} refers to unknown variable {child}",
                    definition.name
                );
            }
        }

        let order = evaluation_order(&variables)?;
        let units = variable_units(&variables, &order)?;

        Ok(Self {
            variables,
            order,
            units,
        })
    }

    /// Parse a definition from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: DefinitionFile = toml::from_str(contents)?;
        Self::new(file.variables)
    }

    /// Read a definition from a TOML file
    pub fn from_path(file_path: &Path) -> Result<Self> {
        let file: DefinitionFile = read_toml(file_path)?;
        Self::new(file.variables).with_context(|| input_err_msg(file_path))
    }

    /// Load one of the bundled definitions
    pub fn bundled(name: &str) -> Result<Self> {
        let contents = bundled_contents(name)?;
        Self::from_toml(contents)
            .with_context(|| format!("Invalid bundled definition: {name}"))
    }

    /// Iterate over variable definitions in the order they were given
    pub fn iter(&self) -> impl Iterator<Item = &VariableDefinition> {
        self.variables.values()
    }

    /// The number of variables
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether there are no variables
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Get the definition of a variable
    pub fn get(&self, name: &str) -> Option<&VariableDefinition> {
        self.variables.get(name)
    }

    /// Variable names in an order in which every variable comes after its children
    pub fn evaluation_order(&self) -> &[VariableName] {
        &self.order
    }

    /// The unit of a variable, as determined by the queries it is computed from
    pub fn unit(&self, name: &str) -> Option<&'static str> {
        self.units.get(name).copied()
    }

    /// The names of all auxiliary tables referenced by terms
    pub fn table_names(&self) -> IndexSet<&str> {
        self.terms()
            .filter_map(|term| match &term.query {
                Query::Table { table, .. } => Some(table.as_str()),
                _ => None,
            })
            .collect()
    }

    /// All terms which compute emissions for specific carriers
    pub fn co2_terms(&self) -> impl Iterator<Item = &Term> {
        self.terms().filter(|term| term.query == Query::Co2)
    }

    fn terms(&self) -> impl Iterator<Item = &Term> {
        self.variables.values().flat_map(|v| v.terms.iter())
    }
}

/// Get the contents of a bundled definition
pub fn bundled_contents(name: &str) -> Result<&'static str> {
    let file = DEFINITIONS_DIR
        .get_file(format!("{name}.toml"))
        .with_context(|| format!("Definition {name} not found"))?;
    file.contents_utf8()
        .with_context(|| format!("Definition {name} is not UTF-8 encoded"))
}

/// The names of the bundled definitions
pub fn bundled_names() -> impl Iterator<Item = &'static str> {
    DEFINITIONS_DIR
        .files()
        .filter_map(|file| file.path().file_stem()?.to_str())
        .sorted()
}

/// Order variables so that children always come before their parents
fn evaluation_order(
    variables: &IndexMap<VariableName, VariableDefinition>,
) -> Result<Vec<VariableName>> {
    let mut graph = Graph::<VariableName, ()>::new();
    let nodes: IndexMap<&VariableName, NodeIndex> = variables
        .keys()
        .map(|name| (name, graph.add_node(name.clone())))
        .collect();
    for definition in variables.values() {
        let parent = nodes[&definition.name];
        for child in &definition.sum_of {
            graph.add_edge(nodes[child], parent, ());
        }
    }

    let order = toposort(&graph, None).map_err(|cycle| {
        anyhow!(
            "Cycle detected in variable definitions for variable {}",
            graph[cycle.node_id()]
        )
    })?;

    Ok(order.into_iter().map(|node| graph[node].clone()).collect())
}

/// Work out the unit of each variable, checking that terms and children are consistent
fn variable_units(
    variables: &IndexMap<VariableName, VariableDefinition>,
    order: &[VariableName],
) -> Result<IndexMap<VariableName, &'static str>> {
    let mut units = IndexMap::new();
    for name in order {
        let definition = &variables[name];
        let term_units = definition.terms.iter().map(|term| term.query.unit());
        let child_units = definition.sum_of.iter().map(|child| units[child]);
        let all_units: IndexSet<&'static str> = term_units.chain(child_units).collect();
        ensure!(
            all_units.len() == 1,
            "Variable {name} mixes quantities with different units: {}",
            all_units.iter().join(", ")
        );
        units.insert(name.clone(), all_units[0]);
    }

    Ok(units)
}
