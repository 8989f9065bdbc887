//! Build a report for every year and region of a run.
use crate::aggregation::emitting_carriers;
use crate::builder::{ReportInputs, build_variables};
use crate::carrier::CarrierID;
use crate::config::ReportConfig;
use crate::definition::Definition;
use crate::input::units::VariableUnits;
use crate::input::{load_network, read_region_table, read_variable_units};
use crate::network::Network;
use crate::table::TableMap;
use crate::variable::{ReportKey, ReportTable, UNKNOWN_UNIT, VariableName};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use itertools::Itertools;
use log::{info, warn};
use std::path::Path;

/// Everything needed to build a report, loaded from a run directory
pub struct Report<'a> {
    run_dir: &'a Path,
    config: &'a ReportConfig,
    definition: Definition,
    units: IndexMap<VariableName, String>,
}

impl<'a> Report<'a> {
    /// Load the definition and units for a run.
    ///
    /// Tables used by the definition must be listed in the configuration.
    pub fn new(run_dir: &'a Path, config: &'a ReportConfig) -> Result<Self> {
        let definition = config.load_definition(run_dir)?;
        for table in definition.table_names() {
            ensure!(
                config.tables.contains_key(table),
                "The report definition uses table {table}, but no path is given for it"
            );
        }

        let units = config
            .units_path(run_dir)
            .map(|path| read_variable_units(&path))
            .transpose()?;
        let units = resolve_units(&definition, units.as_ref());

        Ok(Self {
            run_dir,
            config,
            definition,
            units,
        })
    }

    /// Build the report for the given years.
    ///
    /// The tables for each year are merged into one.
    pub fn build(&self, years: &[u32]) -> Result<ReportTable> {
        let mut report = ReportTable::new();
        for &year in years {
            info!("Calculating report for {year}");
            let table = self
                .build_year(year)
                .with_context(|| format!("Could not build report for {year}"))?;
            report.merge(table)?;
        }

        Ok(report)
    }

    /// Build the report for a single year
    pub fn build_year(&self, year: u32) -> Result<ReportTable> {
        let (network, tables) = self.load_year(year)?;
        let inputs = ReportInputs {
            network: &network,
            tables: &tables,
        };

        let mut report = ReportTable::new();
        for region in self.config.region_filters() {
            let values = build_variables(&self.definition, inputs, &region)?;
            for (variable, value) in values {
                let key = ReportKey {
                    region: region.id.clone(),
                    unit: self.units[&variable].clone(),
                    variable,
                };
                report.insert(key, year, value)?;
            }
        }

        Ok(report)
    }

    /// Check that the inputs for every year can be loaded.
    ///
    /// Emitting technologies which are not included in any emissions category are reported as
    /// warnings.
    pub fn check(&self, years: &[u32]) -> Result<()> {
        for &year in years {
            let (network, _) = self.load_year(year)?;
            let uncovered = uncovered_emitters(&self.definition, &network);
            if !uncovered.is_empty() {
                warn!(
                    "The following carriers emit CO2 in {year} but are not assigned to an \
                    emissions category: {}",
                    uncovered.iter().join(", ")
                );
            }
        }

        Ok(())
    }

    /// Load the network and auxiliary tables for a year
    fn load_year(&self, year: u32) -> Result<(Network, TableMap)> {
        let network_dir = self.config.network_dir(self.run_dir, year);
        info!("Loading network from {}", network_dir.display());
        let network = load_network(&network_dir)?;

        let mut tables = TableMap::new();
        for (name, path) in self.config.table_paths(self.run_dir, year) {
            tables.insert(name.to_string(), read_region_table(&path)?);
        }

        Ok((network, tables))
    }
}

/// Work out the unit label for every variable in the definition.
///
/// If a units file was given, labels are taken from it and any variable missing from the file is
/// given the unit [`UNKNOWN_UNIT`]. Otherwise the unit of the underlying quantity is used.
pub fn resolve_units(
    definition: &Definition,
    units: Option<&VariableUnits>,
) -> IndexMap<VariableName, String> {
    definition
        .iter()
        .map(|variable| {
            let name = &variable.name;
            let unit = match units {
                Some(units) => units.get(name).cloned().unwrap_or_else(|| {
                    warn!("No unit found for variable {name}");
                    UNKNOWN_UNIT.to_string()
                }),
                None => definition
                    .unit(name.as_str())
                    .unwrap_or(UNKNOWN_UNIT)
                    .to_string(),
            };
            (name.clone(), unit)
        })
        .collect()
}

/// Carriers of links connected to the atmosphere which no `co2` term in the definition covers
pub fn uncovered_emitters(definition: &Definition, network: &Network) -> Vec<CarrierID> {
    let is_covered = |carrier: &CarrierID| {
        definition.co2_terms().any(|term| {
            match (&term.carriers, &term.carriers_matching) {
                (Some(carriers), _) => carriers.iter().contains(carrier),
                (None, Some(pattern)) => carrier.as_str().contains(pattern.as_str()),
                (None, None) => false,
            }
        })
    };

    emitting_carriers(network)
        .into_iter()
        .filter(|carrier| !is_covered(carrier))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::gas_wind_network;
    use indexmap::indexmap;
    use rstest::rstest;

    fn definition() -> Definition {
        Definition::from_toml(
            r#"
            [[variables]]
            name = "Emissions|CO2|Electricity"
            terms = [{ kind = "co2", carriers = "gas" }]

            [[variables]]
            name = "Emissions|CO2|Heat"
            terms = [{ kind = "co2", carriers_matching = "CHP" }]

            [[variables]]
            name = "Capacity|Electricity|Wind"
            terms = [{ kind = "capacity", component = "generators", carriers = "wind" }]
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_units_from_definition() {
        let units = resolve_units(&definition(), None);
        assert_eq!(units["Emissions|CO2|Electricity"], "Mt CO2/yr");
        assert_eq!(units["Capacity|Electricity|Wind"], "GW");
    }

    #[test]
    fn test_resolve_units_from_file() {
        let file: VariableUnits = indexmap! {
            "Capacity|Electricity|Wind".into() => "MW".to_string()
        };
        let units = resolve_units(&definition(), Some(&file));
        assert_eq!(units["Capacity|Electricity|Wind"], "MW");
        assert_eq!(units["Emissions|CO2|Electricity"], UNKNOWN_UNIT);
    }

    #[rstest]
    fn test_uncovered_emitters(gas_wind_network: Network) {
        let uncovered = uncovered_emitters(&definition(), &gas_wind_network);
        assert_eq!(uncovered, [CarrierID::from("DAC")]);
    }
}
