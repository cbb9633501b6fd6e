//! Server configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use trickster_oracle::OracleConfig;

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ORACLE_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_ORACLE_MODEL: &str = "gpt-4o-mini";
const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 30;

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Scenario file; the built-in scenario is used when unset.
    pub scenario_path: Option<PathBuf>,
    /// Fixed seed for the keyword sampler.
    pub seed: Option<u64>,
    /// Language-model endpoint settings.
    pub oracle: OracleConfig,
}

impl Config {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let scenario_path = lookup("TRICKSTER_SCENARIO")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);
        let seed = lookup("TRICKSTER_SEED")
            .map(|raw| parse("TRICKSTER_SEED", &raw))
            .transpose()?;

        let api_key = lookup("ORACLE_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config("ORACLE_API_KEY environment variable must be set".to_owned())
            })?;
        let timeout_secs = parse_or(&lookup, "ORACLE_TIMEOUT_SECS", DEFAULT_ORACLE_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(AppError::Config(
                "ORACLE_TIMEOUT_SECS must be greater than zero".to_owned(),
            ));
        }

        let oracle = OracleConfig {
            endpoint: lookup("ORACLE_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_ORACLE_ENDPOINT.to_owned()),
            model: lookup("ORACLE_MODEL").unwrap_or_else(|| DEFAULT_ORACLE_MODEL.to_owned()),
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Self {
            host,
            port,
            scenario_path,
            seed,
            oracle,
        })
    }
}

fn parse<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AppError::Config(format!("{key} must be a valid {}: {e}", short_type_name::<T>())))
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| parse(key, &raw))
}

fn short_type_name<T>() -> &'static str {
    let name = std::any::type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}
