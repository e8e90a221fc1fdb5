use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    /// `None` disables the client timeout.
    pub request_timeout: Option<Duration>,
    pub predict_show_errors: bool,
    pub custom_show_errors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            predict_show_errors: true,
            custom_show_errors: false,
        }
    }
}

impl Config {
    /// Loads `.env.local` then `.env` (first value wins) and reads the process
    /// environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = lookup("PREDICT_BASE_URL")
            .map(|raw| raw.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.base_url);

        let request_timeout = match lookup("PREDICT_TIMEOUT_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
        {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.request_timeout,
        };

        let predict_show_errors = lookup("PREDICT_SHOW_ERRORS")
            .and_then(|val| parse_bool(&val))
            .unwrap_or(defaults.predict_show_errors);
        let custom_show_errors = lookup("CUSTOM_SHOW_ERRORS")
            .and_then(|val| parse_bool(&val))
            .unwrap_or(defaults.custom_show_errors);

        Self {
            base_url,
            request_timeout,
            predict_show_errors,
            custom_show_errors,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
