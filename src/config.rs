//! Configuration loading for ansiweather
//!
//! Settings come from a JSON file (`~/.config/ansiweather/config.json` on
//! Linux) and are resolved once into an immutable [`Config`] that is passed
//! explicitly to the components that need it.

use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::data::Units;

/// Location used when the config file names none
pub const DEFAULT_LOCATION: &str = "Seattle,WA";

/// Default for the `CacheSeconds` setting
pub const DEFAULT_CACHE_SECONDS: u64 = 10 * 60;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No home directory to derive the default config path from
    #[error("Could not determine the configuration directory")]
    NoConfigDir,

    /// An explicitly requested config file does not exist
    #[error("{}: Config file not found", .0.display())]
    NotFound(PathBuf),

    #[error("{}: Config is not a regular file", .0.display())]
    NotRegularFile(PathBuf),

    #[error("{}: Could not read config: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: Invalid config: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: ApiKey is not set", .0.display())]
    MissingApiKey(PathBuf),

    /// Location is not of the form "City,ST"
    #[error("Invalid location: '{0}'. Expected \"City,ST\"")]
    InvalidLocation(String),

    #[error("Invalid units: '{0}'. Valid units: imperial, metric")]
    InvalidUnits(String),
}

/// On-disk layout; keys are PascalCase
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ConfigFile {
    api_key: Option<String>,
    cache_seconds: Option<u64>,
    location: Option<String>,
    city: Option<String>,
    state: Option<String>,
    units: Option<String>,
}

/// Resolved, immutable settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Provider API key
    pub api_key: String,
    /// Accepted from the config file but not used for the staleness decision
    pub cache_seconds: u64,
    /// City as the provider expects it (spaces replaced by underscores)
    pub city: String,
    /// State or region code
    pub state: String,
    pub units: Units,
}

impl Config {
    /// Default config file path from the XDG config directory
    pub fn default_path() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "ansiweather")?;
        Some(project_dirs.config_dir().join("config.json"))
    }

    /// Loads configuration from `path`, or from the default path when `None`.
    ///
    /// A missing file at the default path falls back to defaults, which still
    /// requires an API key. A missing explicit path is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path, true),
            None => {
                let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
                Self::from_file(&path, false)
            }
        }
    }

    fn from_file(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => Some(metadata),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let Some(metadata) = metadata else {
            if required {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            debug!(path = %path.display(), "no config file, using defaults");
            return ConfigFile::default().resolve(path);
        };

        if !metadata.is_file() {
            return Err(ConfigError::NotRegularFile(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content, path)
    }

    /// Parses config JSON; `path` is only used in error messages
    pub fn from_json(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            serde_json::from_str(content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        file.resolve(path)
    }

    /// Returns a copy pointed at another "City,ST" location
    pub fn with_location(self, location: &str) -> Result<Self, ConfigError> {
        let (city, state) = parse_location(location)?;
        Ok(Self { city, state, ..self })
    }

    /// Returns a copy using other units
    pub fn with_units(self, units: Units) -> Self {
        Self { units, ..self }
    }
}

impl ConfigFile {
    fn resolve(self, path: &Path) -> Result<Config, ConfigError> {
        let api_key = match self.api_key {
            Some(key) if !key.trim().is_empty() => key.trim().to_string(),
            _ => return Err(ConfigError::MissingApiKey(path.to_path_buf())),
        };

        let cache_seconds = match self.cache_seconds {
            Some(seconds) if seconds > 0 => seconds,
            _ => DEFAULT_CACHE_SECONDS,
        };

        let location = self
            .location
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string());
        let (mut city, mut state) = parse_location(&location)?;

        // Explicit City/State keys win over Location
        if let Some(c) = self.city.filter(|c| !c.trim().is_empty()) {
            city = normalize_city(&c);
        }
        if let Some(s) = self.state.filter(|s| !s.trim().is_empty()) {
            state = s.trim().to_string();
        }

        let units = match self.units.filter(|u| !u.trim().is_empty()) {
            Some(u) => u.parse::<Units>().map_err(ConfigError::InvalidUnits)?,
            None => Units::default(),
        };

        Ok(Config {
            api_key,
            cache_seconds,
            city,
            state,
            units,
        })
    }
}

/// Splits "City,ST" into provider-ready city and state parts
pub fn parse_location(location: &str) -> Result<(String, String), ConfigError> {
    let invalid = || ConfigError::InvalidLocation(location.to_string());

    let (city, state) = location.split_once(',').ok_or_else(invalid)?;
    let city = normalize_city(city);
    let state = state.trim().to_string();

    if city.is_empty() || state.is_empty() || state.contains(',') {
        return Err(invalid());
    }
    Ok((city, state))
}

fn normalize_city(city: &str) -> String {
    city.split_whitespace().collect::<Vec<_>>().join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn path() -> PathBuf {
        PathBuf::from("/tmp/ansiweather-test.json")
    }

    #[test]
    fn test_from_json_full() {
        let config = Config::from_json(
            r#"{"ApiKey": "abc123", "CacheSeconds": 120, "Location": "Ann Arbor,MI", "Units": "metric"}"#,
            &path(),
        )
        .expect("Config should parse");

        assert_eq!(config.api_key, "abc123");
        assert_eq!(config.cache_seconds, 120);
        assert_eq!(config.city, "Ann_Arbor");
        assert_eq!(config.state, "MI");
        assert_eq!(config.units, Units::Metric);
    }

    #[test]
    fn test_from_json_applies_defaults() {
        let config = Config::from_json(r#"{"ApiKey": "abc123"}"#, &path()).unwrap();

        assert_eq!(config.cache_seconds, DEFAULT_CACHE_SECONDS);
        assert_eq!(config.city, "Seattle");
        assert_eq!(config.state, "WA");
        assert_eq!(config.units, Units::Imperial);
    }

    #[test]
    fn test_zero_cache_seconds_keeps_default() {
        let config =
            Config::from_json(r#"{"ApiKey": "abc123", "CacheSeconds": 0}"#, &path()).unwrap();
        assert_eq!(config.cache_seconds, DEFAULT_CACHE_SECONDS);
    }

    #[test]
    fn test_explicit_city_and_state_override_location() {
        let config = Config::from_json(
            r#"{"ApiKey": "k", "Location": "Seattle,WA", "City": "San Francisco", "State": "CA"}"#,
            &path(),
        )
        .unwrap();

        assert_eq!(config.city, "San_Francisco");
        assert_eq!(config.state, "CA");
    }

    #[test]
    fn test_missing_api_key() {
        let result = Config::from_json(r#"{"Location": "Seattle,WA"}"#, &path());
        assert!(matches!(result, Err(ConfigError::MissingApiKey(_))));

        let result = Config::from_json(r#"{"ApiKey": "   "}"#, &path());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("ApiKey is not set"));
    }

    #[test]
    fn test_invalid_units() {
        let result = Config::from_json(r#"{"ApiKey": "k", "Units": "kelvin"}"#, &path());
        assert!(matches!(result, Err(ConfigError::InvalidUnits(u)) if u == "kelvin"));
    }

    #[test]
    fn test_malformed_json() {
        let result = Config::from_json("{ not json", &path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_parse_location() {
        assert_eq!(
            parse_location("Ann Arbor, MI").unwrap(),
            ("Ann_Arbor".to_string(), "MI".to_string())
        );
        assert!(parse_location("Seattle").is_err());
        assert!(parse_location(",WA").is_err());
        assert!(parse_location("Seattle,").is_err());
        assert!(parse_location("a,b,c").is_err());
    }

    #[test]
    fn test_with_location_and_units() {
        let config = Config::from_json(r#"{"ApiKey": "k"}"#, &path()).unwrap();

        let config = config
            .with_location("Portland,OR")
            .unwrap()
            .with_units(Units::Metric);

        assert_eq!(config.city, "Portland");
        assert_eq!(config.state, "OR");
        assert_eq!(config.units, Units::Metric);
        assert_eq!(config.api_key, "k");
    }

    #[test]
    fn test_load_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("config.json");
        fs::write(&file, r#"{"ApiKey": "from-file"}"#).unwrap();

        let config = Config::load(Some(&file)).expect("Config should load");

        assert_eq!(config.api_key, "from-file");
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("missing.json");

        let result = Config::load(Some(&file));

        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_directory_is_not_regular_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = Config::load(Some(temp_dir.path()));

        assert!(matches!(result, Err(ConfigError::NotRegularFile(_))));
    }

    #[test]
    fn test_missing_default_file_needs_api_key() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("config.json");

        let result = Config::from_file(&file, false);

        assert!(matches!(result, Err(ConfigError::MissingApiKey(p)) if p == file));
    }
}
