//! The command line interface for the program.
use crate::config::ReportConfig;
use crate::log;
use crate::output::{create_output_directory, get_output_dir, write_metadata, write_report};
use crate::region::{RegionID, parse_region_str};
use crate::report::Report;
use crate::settings::Settings;
use crate::year::parse_year_str;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use indexmap::IndexSet;
use itertools::Itertools;
use std::path::{Path, PathBuf};

pub mod definition;
use definition::DefinitionSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for the program.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for the run command
#[derive(Args, Default)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
    /// The years to report on, either "all" or a list separated by semicolons (e.g. "2020;2030")
    #[arg(long)]
    pub years: Option<String>,
    /// The regions to report on, either "all" or a list separated by semicolons (e.g. "DE;FR")
    #[arg(long)]
    pub regions: Option<String>,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Build a report for a run directory.
    Run {
        /// Path to the run directory.
        run_dir: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Check that the inputs for a run can be loaded.
    Validate {
        /// The path to the run directory.
        run_dir: PathBuf,
        /// The years to check, either "all" or a list separated by semicolons
        #[arg(long)]
        years: Option<String>,
    },
    /// Manage bundled report definitions.
    Definition {
        /// The available subcommands for managing report definitions.
        #[command(subcommand)]
        subcommand: DefinitionSubcommands,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { run_dir, opts } => handle_run_command(&run_dir, &opts, None),
            Self::Validate { run_dir, years } => {
                handle_validate_command(&run_dir, years.as_deref(), None)
            }
            Self::Definition { subcommand } => subcommand.execute(),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start the program
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ energy-report --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        // Output program help
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Get the years to report on, which must be a subset of those in the configuration
fn select_years(config: &ReportConfig, years: Option<&str>) -> Result<Vec<u32>> {
    match years {
        Some(years) => parse_year_str(years, &config.years).context("Invalid value for --years"),
        None => Ok(config.years.clone()),
    }
}

/// Restrict the configuration to a subset of its regions
fn select_regions(config: &mut ReportConfig, regions: Option<&str>) -> Result<()> {
    if let Some(regions) = regions {
        let region_ids: IndexSet<RegionID> = config.regions.iter().cloned().collect();
        let selected =
            parse_region_str(regions, &region_ids).context("Invalid value for --regions")?;
        config.regions = selected.into_iter().unique().collect();
    }

    Ok(())
}

/// Handle the `run` command.
pub fn handle_run_command(
    run_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    // Load program settings, if not provided
    let mut settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // This setting can be overridden by command-line argument
    if opts.overwrite {
        settings.overwrite = true;
    }

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(run_path)?;
        &pathbuf
    };

    let overwrite =
        create_output_directory(output_path, settings.overwrite).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    // Initialise program logger
    log::init(Some(&settings.log_level), Some(output_path))
        .context("Failed to initialise logging.")?;

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    let mut config =
        ReportConfig::from_path(run_path).context("Failed to load run configuration.")?;
    let years = select_years(&config, opts.years.as_deref())?;
    select_regions(&mut config, opts.regions.as_deref())?;
    let report = Report::new(run_path, &config).context("Failed to load report definition.")?;
    info!("Loaded run configuration from {}", run_path.display());
    info!("Output folder: {}", output_path.display());

    write_metadata(output_path, run_path, &config, &years)
        .context("Failed to save metadata.")?;
    let table = report.build(&years)?;
    write_report(output_path, &config.model, &config.scenario, &years, &table)
        .context("Failed to write report.")?;
    info!("Report complete! {} rows written", table.len());

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(
    run_path: &Path,
    years: Option<&str>,
    settings: Option<Settings>,
) -> Result<()> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(Some(&settings.log_level), None).context("Failed to initialise logging.")?;

    let config = ReportConfig::from_path(run_path).context("Failed to load run configuration.")?;
    let years = select_years(&config, years)?;
    let report = Report::new(run_path, &config).context("Failed to load report definition.")?;
    report.check(&years).context("Failed to validate inputs.")?;
    info!("Validation successful!");

    Ok(())
}
