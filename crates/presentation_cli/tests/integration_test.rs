//! Integration tests for the forecast-cli binary
//!
//! These run the compiled binary for commands that need no network access.

#![allow(clippy::panic)] // Allow panic! in tests for clear failure messages

use std::process::{Command, Output};

fn forecast_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_forecast-cli"))
        .args(args)
        .env("METOFFICE_API_KEY", "test-key")
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("failed to run forecast-cli: {e}"))
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn help_lists_subcommands() {
    let output = forecast_cli(&["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["forecast", "alerts", "providers"] {
        assert!(text.contains(command), "missing {command} in help");
    }
}

#[test]
fn providers_prints_routing_table() {
    let output = forecast_cli(&["providers"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let text = stdout(&output);
    assert!(text.contains("National Weather Service"));
    assert!(text.contains("Environment Canada"));
    assert!(text.contains("Met Office"));
    assert!(text.contains("Open-Meteo (Météo-France)"));
    assert!(text.contains("Open-Meteo (DWD ICON-EU)"));
    assert!(text.lines().any(|line| line.trim_start().starts_with('*')));
}

#[test]
fn invalid_country_fails_before_any_request() {
    let output = forecast_cli(&["forecast", "USA", "40.0", "-100.0"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("USA"));
}

#[test]
fn out_of_range_latitude_fails() {
    let output = forecast_cli(&["alerts", "US", "95.0", "-100.0"]);
    assert!(!output.status.success());
}

#[test]
fn missing_met_office_key_is_reported() {
    let output = Command::new(env!("CARGO_BIN_EXE_forecast-cli"))
        .arg("providers")
        .env_remove("METOFFICE_API_KEY")
        .env_remove("FORECAST_WEATHER__MET_OFFICE__API_KEY")
        .output()
        .unwrap_or_else(|e| panic!("failed to run forecast-cli: {e}"));
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("METOFFICE_API_KEY"));
}
