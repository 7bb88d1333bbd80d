//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use reqwest::header::HeaderName;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

pub const DEFAULT_BASE_URL: &str = "https://content-plus-core.qa.medad.com";
pub const DEFAULT_TENANT: &str = "_default";
pub const DEFAULT_TENANT_HEADER: &str = "x-content-plus-tenant";
pub const LOGIN_ROUTE: &str = "/login";
pub const MAX_PAGE_SIZE: u32 = 50;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    pub default_tenant: String,
    pub tenant_header: String,
    pub request_timeout: Duration,
    pub session_store_path: PathBuf,
    /// Token used when an auth response carries none. Test/staging only.
    pub fallback_token: Option<String>,
    pub log_level: Level,
    pub min_query_length: usize,
    pub default_page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_tenant: DEFAULT_TENANT.to_string(),
            tenant_header: DEFAULT_TENANT_HEADER.to_string(),
            request_timeout: Duration::from_secs(30),
            session_store_path: PathBuf::from("./.session.json"),
            fallback_token: None,
            log_level: Level::INFO,
            min_query_length: 2,
            default_page_size: 10,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // --- Load Backend Settings ---
        let base_url = lookup("API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "API_BASE_URL".to_string(),
                format!("'{}' is not an http(s) URL", base_url),
            ));
        }

        let default_tenant = lookup("DEFAULT_TENANT")
            .filter(|tenant| !tenant.trim().is_empty())
            .unwrap_or(defaults.default_tenant);
        let tenant_header = lookup("TENANT_HEADER")
            .map(|name| name.trim().to_string())
            .unwrap_or(defaults.tenant_header);
        if HeaderName::from_str(&tenant_header).is_err() {
            return Err(ConfigError::InvalidValue(
                "TENANT_HEADER".to_string(),
                format!("'{}' is not a valid header name", tenant_header),
            ));
        }

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", &raw)?),
            None => defaults.request_timeout,
        };

        // --- Load Session Settings ---
        let session_store_path = lookup("SESSION_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.session_store_path);
        let fallback_token = lookup("FALLBACK_TOKEN").filter(|token| !token.is_empty());

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Search Settings ---
        let min_query_length = match lookup("MIN_QUERY_LENGTH") {
            Some(raw) => parse_var("MIN_QUERY_LENGTH", &raw)?,
            None => defaults.min_query_length,
        };
        let default_page_size = match lookup("DEFAULT_PAGE_SIZE") {
            Some(raw) => parse_var::<u32>("DEFAULT_PAGE_SIZE", &raw)?,
            None => defaults.default_page_size,
        };
        if default_page_size == 0 {
            return Err(ConfigError::InvalidValue(
                "DEFAULT_PAGE_SIZE".to_string(),
                "page size must be positive".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            default_tenant,
            tenant_header,
            request_timeout,
            session_store_path,
            fallback_token,
            log_level,
            min_query_length,
            default_page_size: default_page_size.min(MAX_PAGE_SIZE),
        })
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}
