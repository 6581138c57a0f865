//! Core data models for ansiweather
//!
//! The remote client hands back raw bytes; this module holds the display
//! record those bytes are parsed into.

pub mod weather;

pub use weather::{parse_conditions, Fetcher, WeatherClient, WeatherError};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit system used for temperatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Fahrenheit
    #[default]
    Imperial,
    /// Celsius
    Metric,
}

impl Units {
    /// Temperature suffix for display
    pub fn symbol(&self) -> &'static str {
        match self {
            Units::Imperial => "°F",
            Units::Metric => "°C",
        }
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "imperial" => Ok(Units::Imperial),
            "metric" => Ok(Units::Metric),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Units::Imperial => write!(f, "imperial"),
            Units::Metric => write!(f, "metric"),
        }
    }
}

/// Current conditions at the configured location
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Display name of the observation city
    pub city: String,
    /// Temperature in `units`
    pub temperature: f64,
    pub units: Units,
    /// Short description, e.g. "Partly Cloudy"
    pub conditions: String,
    /// Relative humidity as reported, e.g. "65%"
    pub humidity: String,
}

impl Observation {
    /// Temperature with two decimals and the unit symbol, e.g. "66.30°F"
    pub fn temperature_display(&self) -> String {
        format!("{:.2}{}", self.temperature, self.units.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_from_str() {
        assert_eq!("imperial".parse::<Units>(), Ok(Units::Imperial));
        assert_eq!("Metric".parse::<Units>(), Ok(Units::Metric));
        assert_eq!(" metric ".parse::<Units>(), Ok(Units::Metric));
        assert!("kelvin".parse::<Units>().is_err());
    }

    #[test]
    fn test_units_default_is_imperial() {
        assert_eq!(Units::default(), Units::Imperial);
    }

    #[test]
    fn test_units_display_round_trips_through_from_str() {
        for units in [Units::Imperial, Units::Metric] {
            assert_eq!(units.to_string().parse::<Units>(), Ok(units));
        }
    }

    #[test]
    fn test_temperature_display() {
        let observation = Observation {
            city: "Seattle".to_string(),
            temperature: 66.3,
            units: Units::Imperial,
            conditions: "Partly Cloudy".to_string(),
            humidity: "65%".to_string(),
        };
        assert_eq!(observation.temperature_display(), "66.30°F");

        let metric = Observation {
            temperature: 19.0,
            units: Units::Metric,
            ..observation
        };
        assert_eq!(metric.temperature_display(), "19.00°C");
    }
}
