//! Environment-driven configuration.
//!
//! Every setting has a default so the API server can start with an empty
//! environment (in-memory storage, statistical forecasting only).

use crate::forecasting::ConfidenceMode;
use std::env;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_PREDICTION_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_SUMMARY_ROW_LIMIT: usize = 200;
pub const DEFAULT_SALES_HISTORY_LIMIT: usize = 1000;

/// Deployment environment name (`production`, `sandbox`, ...)
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

/// Postgres connection string, only used when `USE_DATABASE` is also set
pub fn get_database_url() -> Option<String> {
    env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: Option<String>,
    pub use_database: bool,
    pub openai: Option<OpenAiConfig>,
    pub prediction_timeout: Duration,
    pub summary_row_limit: usize,
    pub sales_history_limit: usize,
    pub sparse_history_fallback: bool,
    pub confidence_mode: ConfidenceMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            use_database: false,
            openai: None,
            prediction_timeout: Duration::from_secs(DEFAULT_PREDICTION_TIMEOUT_SECS),
            summary_row_limit: DEFAULT_SUMMARY_ROW_LIMIT,
            sales_history_limit: DEFAULT_SALES_HISTORY_LIMIT,
            sparse_history_fallback: false,
            confidence_mode: ConfidenceMode::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; `from_env` passes the process environment
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let openai = var("OPENAI_API_KEY").map(|api_key| OpenAiConfig {
            api_key,
            base_url: var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        });

        let confidence_mode = match var("CONFIDENCE_MODE") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(
                    value = %raw,
                    fallback = ?defaults.confidence_mode,
                    "Unrecognized CONFIDENCE_MODE, expected 'fixed' or 'variance'"
                );
                defaults.confidence_mode
            }),
            None => defaults.confidence_mode,
        };

        Self {
            port: parse_var(&var, "PORT").unwrap_or(defaults.port),
            database_url: var("DATABASE_URL"),
            use_database: parse_flag(&var, "USE_DATABASE"),
            openai,
            prediction_timeout: parse_var(&var, "PREDICTION_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.prediction_timeout),
            summary_row_limit: parse_var(&var, "SUMMARY_ROW_LIMIT")
                .unwrap_or(defaults.summary_row_limit),
            sales_history_limit: parse_var(&var, "SALES_HISTORY_LIMIT")
                .unwrap_or(defaults.sales_history_limit),
            sparse_history_fallback: parse_flag(&var, "SPARSE_HISTORY_FALLBACK"),
            confidence_mode,
        }
    }

    /// Postgres is used only when a URL is present and explicitly enabled
    pub fn postgres_url(&self) -> Option<&str> {
        if self.use_database {
            self.database_url.as_deref()
        } else {
            None
        }
    }
}

fn parse_var<T: std::str::FromStr>(var: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = var(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "Ignoring unparsable value, using default");
            None
        }
    }
}

fn parse_flag(var: &impl Fn(&str) -> Option<String>, name: &str) -> bool {
    var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
