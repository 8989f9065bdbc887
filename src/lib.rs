//! Common functionality for energy-report.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod aggregation;
pub mod builder;
pub mod carrier;
pub mod cli;
pub mod config;
pub mod definition;
pub mod id;
pub mod input;
pub mod log;
pub mod network;
pub mod output;
pub mod region;
pub mod report;
pub mod settings;
pub mod table;
pub mod units;
pub mod variable;
pub mod year;

#[cfg(test)]
mod fixture;

/// Get the config folder for the program.
///
/// This will be something like: `~/.config/energy-report`. If the platform has no config
/// directory, the current directory is used instead.
pub fn get_config_dir() -> PathBuf {
    let Some(mut dir) = dirs::config_dir() else {
        return PathBuf::from(".");
    };

    dir.push("energy-report");
    dir
}
