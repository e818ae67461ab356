use std::sync::Arc;

use log::{debug, error};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::ApiError;
use super::request::{ApiRequest, ApiResponse, Method, CONTENT_TYPE_HEADER, JSON_CONTENT_TYPE};
use super::transport::HttpTransport;
use super::utils::api_url;
use crate::config::ApiConfig;
use crate::context::ContextSource;
use crate::resolver::{EndpointResolver, ResolvedEndpoint};

/// API client for the console backend.
///
/// The base URL is resolved again for every call, so an `env` switch made by
/// navigating takes effect on the next request without rebuilding the client.
/// Only `Content-Type: application/json` and the timeout are attached;
/// authentication is left to callers.
#[derive(Clone)]
pub struct ApiClient {
    resolver: EndpointResolver,
    context: Arc<dyn ContextSource>,
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    pub fn new(config: ApiConfig, context: Arc<dyn ContextSource>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            resolver: EndpointResolver::new(config),
            context,
            transport,
        }
    }

    /// Client using reqwest and runtime configuration from the environment.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env(context: Arc<dyn ContextSource>) -> crate::error::Result<Self> {
        let config = ApiConfig::from_env()?;
        Ok(Self::new(config, context, Arc::new(super::transport::ReqwestTransport::new())))
    }

    /// Client for the page the wasm module runs in: build-time URLs,
    /// `window.location` and `localStorage`, requests sent with `fetch`.
    #[cfg(target_arch = "wasm32")]
    pub fn browser() -> Self {
        let config = ApiConfig::from_build_env();
        config.log_configuration();
        Self::new(
            config,
            Arc::new(crate::context::WindowContext),
            Arc::new(super::transport::GlooTransport::new()),
        )
    }

    pub fn config(&self) -> &ApiConfig {
        self.resolver.config()
    }

    /// Where the next request would go
    pub fn endpoint(&self) -> ResolvedEndpoint {
        self.resolver.resolve(&self.context.current())
    }

    pub fn build_request(&self, method: Method, path: &str, body: Option<serde_json::Value>) -> ApiRequest {
        let endpoint = self.endpoint();
        ApiRequest {
            method,
            url: api_url(&endpoint.base_url, path),
            headers: vec![(CONTENT_TYPE_HEADER.to_string(), JSON_CONTENT_TYPE.to_string())],
            timeout: self.config().timeout,
            body,
        }
    }

    /// Send a request; non-2xx responses become [`ApiError::Status`].
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<ApiResponse, ApiError> {
        let request = self.build_request(method, path, body);
        debug!("{} {}", request.method, request.url);

        let result = match self.transport.send(request).await {
            Ok(response) if response.is_success() => Ok(response),
            Ok(response) => Err(ApiError::Status {
                status: response.status,
                body: Some(response.body).filter(|b| !b.is_empty()),
            }),
            Err(e) => Err(e),
        };

        result.map_err(log_failure)
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.request(Method::Get, path, None).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.request(Method::Delete, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse, ApiError> {
        let body = encode(body)?;
        self.request(Method::Post, path, Some(body)).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse, ApiError> {
        let body = encode(body)?;
        self.request(Method::Put, path, Some(body)).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse, ApiError> {
        let body = encode(body)?;
        self.request(Method::Patch, path, Some(body)).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get(path).await?.json()
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post(path, body).await?.json()
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::Encode(e.to_string()))
        .map_err(log_failure)
}

fn log_failure(error: ApiError) -> ApiError {
    error!("API Error: {}", error.diagnostic());
    error
}
