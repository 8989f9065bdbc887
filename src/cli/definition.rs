//! Code related to the bundled report definitions and the CLI commands for interacting with them.
use crate::definition::{bundled_contents, bundled_names};
use anyhow::{Result, ensure};
use clap::Subcommand;
use std::fs;
use std::path::{Path, PathBuf};

/// The available subcommands for managing report definitions.
#[derive(Subcommand)]
pub enum DefinitionSubcommands {
    /// List bundled definitions.
    List,
    /// Print the contents of a bundled definition.
    Show {
        /// The name of the definition.
        name: String,
    },
    /// Extract a bundled definition to a file, so that it can be customised.
    Extract {
        /// The name of the definition to extract.
        name: String,
        /// The destination file for the definition.
        new_path: Option<PathBuf>,
    },
}

impl DefinitionSubcommands {
    /// Execute the supplied definition subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::List => handle_definition_list_command(),
            Self::Show { name } => handle_definition_show_command(&name)?,
            Self::Extract { name, new_path } => {
                handle_definition_extract_command(&name, new_path.as_deref())?;
            }
        }

        Ok(())
    }
}

/// Handle the `definition list` command.
fn handle_definition_list_command() {
    for name in bundled_names() {
        println!("{name}");
    }
}

/// Handle the `definition show` command.
fn handle_definition_show_command(name: &str) -> Result<()> {
    print!("{}", bundled_contents(name)?);

    Ok(())
}

/// Handle the `definition extract` command.
pub fn handle_definition_extract_command(name: &str, dest: Option<&Path>) -> Result<()> {
    let default_path = PathBuf::from(format!("{name}.toml"));
    let dest = dest.unwrap_or(&default_path);
    extract_definition(name, dest)
}

/// Write the specified definition to a new file
fn extract_definition(name: &str, new_path: &Path) -> Result<()> {
    let contents = bundled_contents(name)?;
    ensure!(
        !new_path.exists(),
        "Destination file {} already exists",
        new_path.display()
    );
    fs::write(new_path, contents)?;

    Ok(())
}
