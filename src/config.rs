use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::covers::{DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_CONCURRENT_FETCHES};
use crate::error::ConfigError;
use crate::grid::CoverFailurePolicy;
use crate::lastfm::DEFAULT_API_URL;

pub const DEFAULT_PORT: u16 = 9999;

/// Service settings, read once from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub lastfm_api_key: String,
    pub lastfm_api_url: String,
    pub port: u16,
    /// Label font override; the bundled font is used when unset.
    pub font_path: Option<PathBuf>,
    pub placeholder_path: Option<PathBuf>,
    pub fetch_timeout: Duration,
    pub max_concurrent_fetches: usize,
    pub cover_failure_policy: CoverFailurePolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let lastfm_api_key =
            get("LASTFM_API_KEY").ok_or(ConfigError::Missing("LASTFM_API_KEY"))?;

        let fetch_timeout =
            parse_or(&get, "FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT.as_secs())?;
        if fetch_timeout == 0 {
            return Err(ConfigError::Invalid {
                key: "FETCH_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        let max_concurrent_fetches =
            parse_or(&get, "MAX_CONCURRENT_FETCHES", DEFAULT_MAX_CONCURRENT_FETCHES)?;
        if max_concurrent_fetches == 0 {
            return Err(ConfigError::Invalid {
                key: "MAX_CONCURRENT_FETCHES",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            lastfm_api_key,
            lastfm_api_url: get("LASTFM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            port: parse_or(&get, "PORT", DEFAULT_PORT)?,
            font_path: get("FONT_PATH").map(PathBuf::from),
            placeholder_path: get("PLACEHOLDER_PATH").map(PathBuf::from),
            fetch_timeout: Duration::from_secs(fetch_timeout),
            max_concurrent_fetches,
            cover_failure_policy: parse_or(
                &get,
                "COVER_FAILURE_POLICY",
                CoverFailurePolicy::default(),
            )?,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
