//! Runtime configuration.
//!
//! Everything is read from the process environment with development
//! defaults. The model API key is read but never validated here: a missing
//! key only surfaces as a failed model call for each URL.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Environment variable names.
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const ENV_OPENAI_TIMEOUT_SECS: &str = "OPENAI_TIMEOUT_SECS";
pub const ENV_BASE_URL: &str = "CLOSURES_BASE_URL";
pub const ENV_REGION: &str = "CLOSURES_REGION";
pub const ENV_OUTPUT: &str = "CLOSURES_OUTPUT";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";
pub const ENV_CONCURRENCY: &str = "PIPELINE_CONCURRENCY";
pub const ENV_MAX_RETRIES: &str = "PIPELINE_MAX_RETRIES";
pub const ENV_BASE_BACKOFF_MS: &str = "PIPELINE_BASE_BACKOFF_MS";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://www.corpuschristitx.gov/department-directory/public-works/street-closures-and-traffic-impacts";
pub const DEFAULT_REGION: &str = "Corpus Christi, Texas";
pub const DEFAULT_OUTPUT: &str = "construction_data.json";
const DEFAULT_OPENAI_TIMEOUT_SECS: u64 = 60;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CONCURRENCY: usize = 4;
const DEFAULT_MAX_RETRIES: u32 = 0;
const DEFAULT_BASE_BACKOFF_MS: u64 = 1000;

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_timeout: Duration,
    /// Publication path the weekly page slugs are appended to.
    pub base_url: String,
    /// City/region named in the extraction prompt.
    pub region: String,
    pub output: PathBuf,
    pub fetch_timeout: Duration,
    pub concurrency: usize,
    pub max_retries: u32,
    pub base_backoff_ms: u64,
}

impl Config {
    /// Load from environment variables, falling back to defaults.
    ///
    /// Fails only when a numeric variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let concurrency = parse_var(ENV_CONCURRENCY, DEFAULT_CONCURRENCY)?;
        if concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: ENV_CONCURRENCY,
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            openai_api_key: env::var(ENV_OPENAI_API_KEY).unwrap_or_default(),
            openai_base_url: string_var(ENV_OPENAI_BASE_URL, DEFAULT_OPENAI_BASE_URL),
            openai_model: string_var(ENV_OPENAI_MODEL, DEFAULT_OPENAI_MODEL),
            openai_timeout: Duration::from_secs(parse_var(
                ENV_OPENAI_TIMEOUT_SECS,
                DEFAULT_OPENAI_TIMEOUT_SECS,
            )?),
            base_url: string_var(ENV_BASE_URL, DEFAULT_BASE_URL),
            region: string_var(ENV_REGION, DEFAULT_REGION),
            output: PathBuf::from(string_var(ENV_OUTPUT, DEFAULT_OUTPUT)),
            fetch_timeout: Duration::from_secs(parse_var(
                ENV_FETCH_TIMEOUT_SECS,
                DEFAULT_FETCH_TIMEOUT_SECS,
            )?),
            concurrency,
            max_retries: parse_var(ENV_MAX_RETRIES, DEFAULT_MAX_RETRIES)?,
            base_backoff_ms: parse_var(ENV_BASE_BACKOFF_MS, DEFAULT_BASE_BACKOFF_MS)?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_timeout: Duration::from_secs(DEFAULT_OPENAI_TIMEOUT_SECS),
            base_url: DEFAULT_BASE_URL.to_string(),
            region: DEFAULT_REGION.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            max_retries: DEFAULT_MAX_RETRIES,
            base_backoff_ms: DEFAULT_BASE_BACKOFF_MS,
        }
    }
}

fn string_var(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    field: key,
                    reason: format!("expected a number, got '{}'", raw),
                })
        }
        _ => Ok(default),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
