//! Defines the `ReportConfig` struct, which represents the contents of `report.toml`.
use crate::definition::{Definition, bundled_names};
use crate::input::{input_err_msg, is_sorted_and_unique, read_toml};
use crate::region::{RegionFilter, RegionID, RegionMatch};
use anyhow::{Context, Result, ensure};
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The name of the run configuration file
pub const REPORT_CONFIG_FILE_NAME: &str = "report.toml";

/// The placeholder in path templates which is replaced by the year
const YEAR_PLACEHOLDER: &str = "{year}";

fn default_definition() -> String {
    crate::definition::DEFAULT_DEFINITION_NAME.to_string()
}

/// Represents the contents of the entire run configuration file.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ReportConfig {
    /// The name of the model which produced the networks
    pub model: String,
    /// The name of the scenario
    pub scenario: String,
    /// The regions to report on
    pub regions: Vec<RegionID>,
    /// How regions are matched against network identifiers
    #[serde(default)]
    pub region_match: RegionMatch,
    /// The years to report on, in order
    pub years: Vec<u32>,
    /// Path to the network snapshot for each year, with `{year}` as a placeholder
    pub network: String,
    /// Either the name of a bundled definition or the path to a definition file
    #[serde(default = "default_definition")]
    pub definition: String,
    /// Path to a CSV file giving the unit of each variable
    pub units: Option<PathBuf>,
    /// Paths to auxiliary tables, with `{year}` as a placeholder
    #[serde(default)]
    pub tables: IndexMap<String, String>,
}

/// Check that a path template can give a different path for each year
fn check_template(template: &str, years: &[u32]) -> Result<()> {
    ensure!(!template.is_empty(), "Path cannot be empty");
    ensure!(
        years.len() == 1 || template.contains(YEAR_PLACEHOLDER),
        "Path {template} must contain {YEAR_PLACEHOLDER} when reporting on more than one year"
    );

    Ok(())
}

/// Check that the `years` parameter is valid
fn check_years(years: &[u32]) -> Result<()> {
    ensure!(!years.is_empty(), "`years` is empty");
    ensure!(
        is_sorted_and_unique(years),
        "`years` must be composed of unique values in order"
    );

    Ok(())
}

/// Check that the `regions` parameter is valid
fn check_regions(regions: &[RegionID]) -> Result<()> {
    ensure!(!regions.is_empty(), "`regions` is empty");
    let mut seen = IndexSet::new();
    for region in regions {
        ensure!(!region.as_str().is_empty(), "Region names cannot be empty");
        ensure!(seen.insert(region), "Duplicate region: {region}");
    }

    Ok(())
}

impl ReportConfig {
    /// Read a run configuration file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `run_dir` - Folder containing the run configuration
    ///
    /// # Returns
    ///
    /// The file contents as a [`ReportConfig`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(run_dir: P) -> Result<ReportConfig> {
        let file_path = run_dir.as_ref().join(REPORT_CONFIG_FILE_NAME);
        let config: ReportConfig = read_toml(&file_path)?;

        config.validate().with_context(|| input_err_msg(file_path))?;

        Ok(config)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        ensure!(!self.model.is_empty(), "`model` cannot be empty");
        ensure!(!self.scenario.is_empty(), "`scenario` cannot be empty");
        check_regions(&self.regions)?;
        check_years(&self.years)?;
        check_template(&self.network, &self.years).context("Invalid value for `network`")?;
        for (name, template) in &self.tables {
            check_template(template, &self.years)
                .with_context(|| format!("Invalid path for table {name}"))?;
        }

        Ok(())
    }

    /// A filter for each region, in the order given
    pub fn region_filters(&self) -> Vec<RegionFilter> {
        self.regions
            .iter()
            .map(|id| RegionFilter::new(id.clone(), self.region_match))
            .collect()
    }

    /// The network snapshot directory for a year
    pub fn network_dir(&self, run_dir: &Path, year: u32) -> PathBuf {
        run_dir.join(expand_template(&self.network, year))
    }

    /// The path to each auxiliary table for a year
    pub fn table_paths<'a>(
        &'a self,
        run_dir: &'a Path,
        year: u32,
    ) -> impl Iterator<Item = (&'a str, PathBuf)> {
        self.tables.iter().map(move |(name, template)| {
            (name.as_str(), run_dir.join(expand_template(template, year)))
        })
    }

    /// The path to the units file, if there is one
    pub fn units_path(&self, run_dir: &Path) -> Option<PathBuf> {
        self.units.as_ref().map(|path| run_dir.join(path))
    }

    /// Load the report definition, which is either bundled or relative to `run_dir`
    pub fn load_definition(&self, run_dir: &Path) -> Result<Definition> {
        if bundled_names().any(|name| name == self.definition) {
            return Definition::bundled(&self.definition);
        }

        Definition::from_path(&run_dir.join(&self.definition))
    }
}

/// Replace the year placeholder in a path template
fn expand_template(template: &str, year: u32) -> String {
    template.replace(YEAR_PLACEHOLDER, &year.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const VALID: &str = r#"
        model = "PyPSA-Eur"
        scenario = "baseline"
        regions = ["DE", "FR"]
        years = [2020, 2030]
        network = "networks/{year}"

        [tables]
        industry_demand = "industry/demand_{year}.csv"
        "#;

    fn write_config(dir: &Path, contents: &str) {
        let mut file = File::create(dir.join(REPORT_CONFIG_FILE_NAME)).unwrap();
        writeln!(file, "{contents}").unwrap();
    }

    #[test]
    fn test_from_path() {
        let dir = tempdir().unwrap();
        write_config(dir.path(), VALID);

        let config = ReportConfig::from_path(dir.path()).unwrap();
        assert_eq!(config.model, "PyPSA-Eur");
        assert_eq!(config.region_match, RegionMatch::Location);
        assert_eq!(config.definition, "default");
        assert_eq!(config.units, None);
        assert_eq!(
            config.network_dir(dir.path(), 2030),
            dir.path().join("networks/2030")
        );
        let tables: Vec<_> = config.table_paths(dir.path(), 2020).collect();
        assert_eq!(
            tables,
            [(
                "industry_demand",
                dir.path().join("industry/demand_2020.csv")
            )]
        );
        let filters = config.region_filters();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[1].id, "FR".into());
    }

    #[rstest]
    #[case("years = [2030, 2020]", "`years` must be composed of unique values in order")]
    #[case("years = []", "`years` is empty")]
    #[case("regions = [\"DE\", \"DE\"]", "Duplicate region: DE")]
    #[case("network = \"networks/2020\"", "Invalid value for `network`")]
    fn test_invalid_config(#[case] replacement: &str, #[case] msg: &str) {
        let key = replacement.split_once(" = ").unwrap().0;
        let contents = VALID
            .lines()
            .map(|line| {
                if line.trim_start().starts_with(&format!("{key} =")) {
                    replacement
                } else {
                    line
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        let dir = tempdir().unwrap();
        write_config(dir.path(), &contents);
        let err = ReportConfig::from_path(dir.path()).unwrap_err();
        assert_eq!(err.chain().nth(1).unwrap().to_string(), msg);
    }

    #[test]
    fn test_single_year_without_placeholder() {
        let dir = tempdir().unwrap();
        write_config(
            dir.path(),
            r#"
            model = "m"
            scenario = "s"
            regions = ["DE"]
            years = [2020]
            network = "network"
            "#,
        );
        let config = ReportConfig::from_path(dir.path()).unwrap();
        assert_eq!(
            config.network_dir(dir.path(), 2020),
            dir.path().join("network")
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert_error!(
            ReportConfig::from_path(dir.path()),
            input_err_msg(dir.path().join(REPORT_CONFIG_FILE_NAME))
        );
    }

    #[test]
    fn test_load_definition() {
        let dir = tempdir().unwrap();
        write_config(dir.path(), VALID);
        let config = ReportConfig::from_path(dir.path()).unwrap();
        assert!(config.load_definition(dir.path()).is_ok());

        let custom = ReportConfig {
            definition: "custom.toml".into(),
            ..config
        };
        let mut file = File::create(dir.path().join("custom.toml")).unwrap();
        writeln!(
            file,
            "[[variables]]\nname = \"Capacity|Grid\"\nterms = [{{ kind = \"transmission_capacity\" }}]"
        )
        .unwrap();
        let definition = custom.load_definition(dir.path()).unwrap();
        assert_eq!(definition.len(), 1);
    }
}
