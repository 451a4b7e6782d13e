//! Forecast CLI
//!
//! Command-line front end for the forecast aggregator.

#![allow(clippy::print_stdout)]

mod render;

use std::path::PathBuf;

use application::WeatherService;
use clap::{Parser, Subcommand};
use infrastructure::{AppConfig, build_weather_service, init_tracing};

/// Forecast CLI
#[derive(Parser)]
#[command(name = "forecast-cli")]
#[command(author, version, about = "Multi-provider weather forecasts", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a forecast
    ///
    /// Example: forecast-cli forecast US 46.8523 -121.7603 --days 3
    Forecast {
        /// ISO 3166-1 alpha-2 country code (UK is accepted for GB)
        country: String,

        /// Latitude in decimal degrees
        #[arg(allow_hyphen_values = true)]
        latitude: f64,

        /// Longitude in decimal degrees
        #[arg(allow_hyphen_values = true)]
        longitude: f64,

        /// Number of days to forecast
        #[arg(short, long, default_value = "7")]
        days: u8,

        /// Attach active weather alerts
        #[arg(long)]
        alerts: bool,

        /// Print the forecast as JSON
        #[arg(long)]
        json: bool,
    },

    /// List active weather alerts
    Alerts {
        /// ISO 3166-1 alpha-2 country code (UK is accepted for GB)
        country: String,

        /// Latitude in decimal degrees
        #[arg(allow_hyphen_values = true)]
        latitude: f64,

        /// Longitude in decimal degrees
        #[arg(allow_hyphen_values = true)]
        longitude: f64,

        /// Print the alerts as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which provider serves each country
    Providers,
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(filter) = log_filter_from_verbosity(cli.verbose) {
        config.telemetry.log_filter = filter.to_string();
    }
    Ok(config)
}

async fn run(service: &WeatherService, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Forecast {
            country,
            latitude,
            longitude,
            days,
            alerts,
            json,
        } => {
            let forecast = if alerts {
                service
                    .get_forecast_with_alerts(&country, latitude, longitude, days)
                    .await?
            } else {
                service
                    .get_forecast(&country, latitude, longitude, days)
                    .await?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&forecast)?);
            } else {
                print!("{}", render::forecast(&forecast));
            }
        },

        Commands::Alerts {
            country,
            latitude,
            longitude,
            json,
        } => {
            let alerts = service.get_alerts(&country, latitude, longitude).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&alerts)?);
            } else {
                print!("{}", render::alerts(&alerts));
            }
        },

        Commands::Providers => {
            print!("{}", render::routes(&service.routes()));
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config.telemetry)?;

    let runtime = build_weather_service(&config.weather)?;
    let result = run(&runtime.service, cli.command).await;
    runtime.shutdown();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn log_filter_verbosity_zero_keeps_config() {
        assert_eq!(log_filter_from_verbosity(0), None);
    }

    #[test]
    fn log_filter_verbosity_levels() {
        assert_eq!(log_filter_from_verbosity(1), Some("info"));
        assert_eq!(log_filter_from_verbosity(2), Some("debug"));
        assert_eq!(log_filter_from_verbosity(3), Some("trace"));
        assert_eq!(log_filter_from_verbosity(10), Some("trace"));
    }

    #[test]
    fn forecast_accepts_negative_longitude() {
        let cli = parse(&["forecast-cli", "forecast", "US", "46.8523", "-121.7603"]);
        match cli.command {
            Commands::Forecast {
                country,
                latitude,
                longitude,
                days,
                alerts,
                json,
            } => {
                assert_eq!(country, "US");
                assert!((latitude - 46.8523).abs() < f64::EPSILON);
                assert!((longitude + 121.7603).abs() < f64::EPSILON);
                assert_eq!(days, 7);
                assert!(!alerts);
                assert!(!json);
            },
            _ => panic!("Expected Forecast command"),
        }
    }

    #[test]
    fn forecast_flags() {
        let cli = parse(&[
            "forecast-cli", "-vv", "forecast", "GB", "51.5", "-0.12", "--days", "2", "--alerts",
            "--json",
        ]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Forecast {
                days: 2,
                alerts: true,
                json: true,
                ..
            }
        ));
    }

    #[test]
    fn alerts_and_providers_parse() {
        let cli = parse(&["forecast-cli", "alerts", "CA", "45.42", "-75.69"]);
        assert!(matches!(cli.command, Commands::Alerts { json: false, .. }));

        let cli = parse(&["forecast-cli", "--config", "forecast.toml", "providers"]);
        assert!(matches!(cli.command, Commands::Providers));
        assert_eq!(cli.config, Some(PathBuf::from("forecast.toml")));
    }

    #[test]
    fn days_must_fit_in_a_byte() {
        assert!(
            Cli::try_parse_from(["forecast-cli", "forecast", "US", "40", "-100", "--days", "300"])
                .is_err()
        );
    }

    #[test]
    fn missing_coordinates_are_rejected() {
        assert!(Cli::try_parse_from(["forecast-cli", "forecast", "US", "40"]).is_err());
    }
}
