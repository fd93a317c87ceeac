use std::env;
use std::time::Duration;

use crate::error::BookingError;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // API
    pub api_base_url: String,
    pub request_timeout: Option<Duration>,

    // Navigation targets
    pub dashboard_path: String,
    pub login_path: String,

    // Post-success delays
    pub modal_close_delay: Duration,
    pub redirect_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout: None,
            dashboard_path: "/admin/dashboard".to_string(),
            login_path: "/admin/login".to_string(),
            modal_close_delay: Duration::from_millis(1000),
            redirect_delay: Duration::from_millis(1500),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, BookingError> {
        let defaults = Self::default();
        Ok(Self {
            api_base_url: env::var("PARK_API_BASE_URL").unwrap_or(defaults.api_base_url),
            request_timeout: optional_number("PARK_API_TIMEOUT_SECS")?.map(Duration::from_secs),
            dashboard_path: env::var("PARK_DASHBOARD_PATH").unwrap_or(defaults.dashboard_path),
            login_path: env::var("PARK_LOGIN_PATH").unwrap_or(defaults.login_path),
            modal_close_delay: optional_number("PARK_MODAL_CLOSE_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.modal_close_delay),
            redirect_delay: optional_number("PARK_REDIRECT_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.redirect_delay),
        })
    }

    /// Config with zero delays, for driving controllers in tests.
    pub fn immediate() -> Self {
        Self {
            modal_close_delay: Duration::ZERO,
            redirect_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn log_summary(&self) {
        tracing::info!(
            api_base_url = %self.api_base_url,
            timeout_secs = ?self.request_timeout.map(|t| t.as_secs()),
            dashboard_path = %self.dashboard_path,
            login_path = %self.login_path,
            "Loaded client config"
        );
    }
}

fn optional_number(key: &str) -> Result<Option<u64>, BookingError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| BookingError::Config(format!("{key} must be a number, got {raw:?}"))),
        Err(_) => Ok(None),
    }
}
