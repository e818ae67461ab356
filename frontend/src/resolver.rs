use log::{debug, warn};
use pice_shared::{Deployment, Environment};

use crate::config::{ApiConfig, ENV_QUERY_PARAM, ENV_STORAGE_KEY, LOCAL_LIVE_API_URL, LOCAL_TEST_API_URL};
use crate::context::ExecutionContext;

/// Pick the environment for the current request.
///
/// Server-side this is always `live`. In the browser an `env` query parameter
/// wins and is persisted for later pages; without one the persisted choice
/// applies, and `live` when nothing was ever chosen.
pub fn resolve_environment(ctx: &ExecutionContext) -> Environment {
    let browser = match ctx {
        ExecutionContext::Server => return Environment::Live,
        ExecutionContext::Browser(browser) => browser,
    };

    if let Some(requested) = browser
        .location
        .query_param(ENV_QUERY_PARAM)
        .and_then(|tag| Environment::from_tag(&tag))
    {
        if let Err(e) = browser.storage.set(ENV_STORAGE_KEY, requested.as_str()) {
            warn!("Failed to persist environment '{}': {}", requested, e);
        }
        return requested;
    }

    browser
        .storage
        .get(ENV_STORAGE_KEY)
        .and_then(|tag| Environment::from_tag(&tag))
        .unwrap_or_default()
}

/// The environment and base URL a request was sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub environment: Environment,
    pub base_url: String,
}

/// Maps environments to backend base URLs.
#[derive(Debug, Clone, Default)]
pub struct EndpointResolver {
    config: ApiConfig,
}

impl EndpointResolver {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Base URL for `env` under `ctx`.
    ///
    /// Pages served from a loopback host talk to the local backends; every
    /// other context uses the configured (or hosted) URL for the deployment.
    pub fn resolve_base_url(&self, env: &Environment, ctx: &ExecutionContext) -> String {
        let deployment = env.deployment();

        if let ExecutionContext::Browser(browser) = ctx {
            if browser.location.is_loopback() {
                return match deployment {
                    Deployment::Test => LOCAL_TEST_API_URL.to_string(),
                    Deployment::Live => LOCAL_LIVE_API_URL.to_string(),
                };
            }
        }

        self.config.api_url(deployment).to_string()
    }

    pub fn resolve(&self, ctx: &ExecutionContext) -> ResolvedEndpoint {
        let environment = resolve_environment(ctx);
        let base_url = self.resolve_base_url(&environment, ctx);
        debug!("Resolved environment '{}' to {}", environment, base_url);
        ResolvedEndpoint { environment, base_url }
    }
}
