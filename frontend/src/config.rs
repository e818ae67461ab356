use std::env;
use std::time::Duration;

use dotenv::dotenv;
use log::{info, warn};
use pice_shared::Deployment;

use crate::error::{ClientError, Result};

/// Hosted live API, used when no live URL is configured
pub const DEFAULT_LIVE_API_URL: &str = "https://pice-console-live-api.azurewebsites.net/api/v1";
/// Hosted test API, used when no test URL is configured
pub const DEFAULT_TEST_API_URL: &str = "https://pice-console-test-api.azurewebsites.net/api/v1";

/// Local backend serving the live dataset during development
pub const LOCAL_LIVE_API_URL: &str = "http://localhost:8002/api/v1";
/// Local backend serving the test dataset during development
pub const LOCAL_TEST_API_URL: &str = "http://localhost:8001/api/v1";

/// Per-request ceiling for external API calls
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(45_000);

/// Query parameter that switches the environment for this and later page loads
pub const ENV_QUERY_PARAM: &str = "env";
/// Storage key holding the last selected environment
pub const ENV_STORAGE_KEY: &str = "pice_env";

pub const LIVE_API_URL_VAR: &str = "VITE_LIVE_API_URL";
pub const TEST_API_URL_VAR: &str = "VITE_TEST_API_URL";
/// Native runtime override only; browser builds keep [`REQUEST_TIMEOUT`].
pub const TIMEOUT_VAR: &str = "PICE_API_TIMEOUT_MS";

/// Backend addresses and request settings for [`crate::api::ApiClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub live_api_url: Option<String>,
    pub test_api_url: Option<String>,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            live_api_url: None,
            test_api_url: None,
            timeout: REQUEST_TIMEOUT,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.trim_end_matches('/').to_string())
}

impl ApiConfig {
    /// URLs baked in at compile time through `VITE_LIVE_API_URL` / `VITE_TEST_API_URL`.
    pub fn from_build_env() -> Self {
        Self {
            live_api_url: non_blank(option_env!("VITE_LIVE_API_URL")),
            test_api_url: non_blank(option_env!("VITE_TEST_API_URL")),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Runtime configuration: loads an optional `.env` file, then lets process
    /// variables override the compile-time values.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let config = Self::from_lookup(|name| env::var(name).ok())?;
        config.log_configuration();
        Ok(config)
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let build = Self::from_build_env();

        let timeout = match non_blank(lookup(TIMEOUT_VAR).as_deref()) {
            Some(raw) => {
                let millis: u64 = raw.parse().map_err(|_| {
                    ClientError::Config(format!("{} must be a number of milliseconds, got '{}'", TIMEOUT_VAR, raw))
                })?;
                Duration::from_millis(millis)
            }
            None => build.timeout,
        };

        let config = Self {
            live_api_url: non_blank(lookup(LIVE_API_URL_VAR).as_deref()).or(build.live_api_url),
            test_api_url: non_blank(lookup(TEST_API_URL_VAR).as_deref()).or(build.test_api_url),
            timeout,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn with_live_api_url(mut self, url: impl AsRef<str>) -> Self {
        self.live_api_url = non_blank(Some(url.as_ref()));
        self
    }

    pub fn with_test_api_url(mut self, url: impl AsRef<str>) -> Self {
        self.test_api_url = non_blank(Some(url.as_ref()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Hosted API URL for a deployment, falling back to the built-in address.
    pub fn api_url(&self, deployment: Deployment) -> &str {
        match deployment {
            Deployment::Live => self.live_api_url.as_deref().unwrap_or(DEFAULT_LIVE_API_URL),
            Deployment::Test => self.test_api_url.as_deref().unwrap_or(DEFAULT_TEST_API_URL),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [(LIVE_API_URL_VAR, &self.live_api_url), (TEST_API_URL_VAR, &self.test_api_url)] {
            if let Some(raw) = value {
                let parsed = url::Url::parse(raw).map_err(|e| ClientError::InvalidUrl {
                    url: raw.clone(),
                    reason: e.to_string(),
                })?;
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    return Err(ClientError::Config(format!(
                        "{} must be an http(s) URL, got '{}'",
                        name, raw
                    )));
                }
            }
        }

        if self.timeout.is_zero() {
            return Err(ClientError::Config("request timeout must be greater than zero".to_string()));
        }

        Ok(())
    }

    pub(crate) fn log_configuration(&self) {
        info!("API configuration:");
        info!("  Live API: {}", self.api_url(Deployment::Live));
        info!("  Test API: {}", self.api_url(Deployment::Test));
        info!("  Timeout: {}ms", self.timeout.as_millis());
        if self.live_api_url.is_none() && self.test_api_url.is_none() {
            warn!("No API URLs configured, using hosted defaults");
        }
    }
}
