//! Wires configuration, cache, client and formatter into one invocation

use tracing::debug;

use crate::cache::{location_key, CacheStore, FreshnessPolicy};
use crate::cli::{Cli, Overrides};
use crate::config::Config;
use crate::data::{parse_conditions, WeatherClient};
use crate::error::Error;
use crate::format::format_status;
use crate::orchestrator::Orchestrator;

/// Resolves the effective configuration for this invocation
pub fn resolve_config(cli: &Cli) -> Result<Config, Error> {
    let overrides = Overrides::from_cli(cli)?;
    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(location) = overrides.location.as_deref() {
        config = config.with_location(location)?;
    }
    if let Some(units) = overrides.units {
        config = config.with_units(units);
    }

    let policy = FreshnessPolicy::default();
    debug!(
        city = %config.city,
        state = %config.state,
        units = %config.units,
        cache_seconds = config.cache_seconds,
        threshold_secs = policy.threshold().num_seconds(),
        "configuration resolved; CacheSeconds does not change the staleness threshold"
    );
    Ok(config)
}

/// Runs one invocation and returns the status line to print
pub async fn run(cli: &Cli) -> Result<String, Error> {
    let config = resolve_config(cli)?;

    let key = location_key(&config.state, &config.city);
    let store = CacheStore::new(&key).ok_or(Error::HomeDirUnavailable)?;
    let client = WeatherClient::new(&config)?;
    let orchestrator = Orchestrator::new(client, store);

    let bytes = orchestrator.get_weather_data().await?;
    let observation = parse_conditions(&bytes, config.units)?;

    Ok(format_status(&observation, cli.shell))
}
