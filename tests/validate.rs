//! Integration tests for the `validate` command.
use energy_report::cli::handle_validate_command;
use energy_report::log::is_logger_initialised;
use energy_report::settings::Settings;
use std::path::PathBuf;

/// Get the path to the demo run.
fn get_run_dir() -> PathBuf {
    PathBuf::from("demos/simple")
}

/// An integration test for the `validate` command.
///
/// We also check that the logger is initialised after it is run.
#[test]
fn test_handle_validate_command() {
    unsafe { std::env::set_var("ENERGY_REPORT_LOG_LEVEL", "off") };

    assert!(!is_logger_initialised());

    handle_validate_command(&get_run_dir(), Some("2030"), Some(Settings::default())).unwrap();

    assert!(is_logger_initialised());
}
