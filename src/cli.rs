//! Command-line interface parsing for ansiweather
//!
//! Flags override the config file for a single invocation; nothing is written
//! back.

use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

use crate::data::Units;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified units are not recognized
    #[error("Invalid units: '{0}'. Valid units: imperial, metric")]
    InvalidUnits(String),
}

/// ansiweather - current weather as a colorized one-line status string
#[derive(Parser, Debug)]
#[command(name = "ansiweather")]
#[command(about = "Current weather as a compact, colorized status line")]
#[command(version)]
pub struct Cli {
    /// Escape ANSI color sequences so they are ignored for length purposes
    /// in a zsh prompt
    #[arg(long)]
    pub shell: bool,

    /// Read settings from this JSON file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the configured location, e.g. "Ann Arbor,MI"
    #[arg(long, value_name = "CITY,ST")]
    pub location: Option<String>,

    /// Override the configured units (imperial, metric)
    #[arg(long, value_name = "UNITS")]
    pub units: Option<String>,

    /// Log cache and network decisions to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Per-invocation overrides derived from CLI arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub location: Option<String>,
    pub units: Option<Units>,
}

/// Parses a units string argument.
pub fn parse_units_arg(s: &str) -> Result<Units, CliError> {
    s.parse::<Units>()
        .map_err(|_| CliError::InvalidUnits(s.to_string()))
}

impl Overrides {
    /// Creates Overrides from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Err(CliError)` if invalid units were specified
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let units = cli.units.as_deref().map(parse_units_arg).transpose()?;
        Ok(Overrides {
            location: cli.location.clone(),
            units,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units_arg() {
        assert_eq!(parse_units_arg("imperial").unwrap(), Units::Imperial);
        assert_eq!(parse_units_arg("METRIC").unwrap(), Units::Metric);
    }

    #[test]
    fn test_parse_units_arg_invalid() {
        let err = parse_units_arg("kelvin").unwrap_err();
        assert!(err.to_string().contains("Invalid units"));
        assert!(err.to_string().contains("kelvin"));
    }

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["ansiweather"]);
        assert!(!cli.shell);
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
        assert!(cli.location.is_none());
        assert!(cli.units.is_none());
    }

    #[test]
    fn test_cli_parse_all_flags() {
        let cli = Cli::parse_from([
            "ansiweather",
            "--shell",
            "--config",
            "/tmp/weather.json",
            "--location",
            "Ann Arbor,MI",
            "--units",
            "metric",
            "-v",
        ]);
        assert!(cli.shell);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/weather.json")));
        assert_eq!(cli.location.as_deref(), Some("Ann Arbor,MI"));
        assert_eq!(cli.units.as_deref(), Some("metric"));
    }

    #[test]
    fn test_overrides_default() {
        let cli = Cli::parse_from(["ansiweather"]);
        let overrides = Overrides::from_cli(&cli).unwrap();
        assert_eq!(overrides, Overrides::default());
    }

    #[test]
    fn test_overrides_from_cli() {
        let cli = Cli::parse_from(["ansiweather", "--units", "metric", "--location", "Portland,OR"]);
        let overrides = Overrides::from_cli(&cli).unwrap();
        assert_eq!(overrides.units, Some(Units::Metric));
        assert_eq!(overrides.location.as_deref(), Some("Portland,OR"));
    }

    #[test]
    fn test_overrides_from_cli_invalid_units() {
        let cli = Cli::parse_from(["ansiweather", "--units", "kelvin"]);
        assert!(Overrides::from_cli(&cli).is_err());
    }
}
