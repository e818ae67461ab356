use async_trait::async_trait;

use super::error::ApiError;
use super::request::{ApiRequest, ApiResponse};

/// Sends one request and reports what came back.
///
/// Any HTTP status is a successful exchange at this level; status checks
/// belong to [`super::ApiClient`]. Browser futures are not `Send`, so the
/// wasm build drops that bound on `send`.
#[cfg_attr(test, mockall::automock)]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::ReqwestTransport;

#[cfg(target_arch = "wasm32")]
pub use browser::GlooTransport;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::Client;

    use super::HttpTransport;
    use crate::api::error::ApiError;
    use crate::api::request::{ApiRequest, ApiResponse, Method};

    /// Production transport backed by reqwest
    #[derive(Debug, Clone, Default)]
    pub struct ReqwestTransport {
        client: Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Self {
            Self { client: Client::new() }
        }

        pub fn with_client(client: Client) -> Self {
            Self { client }
        }
    }

    fn to_reqwest_method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }

    fn map_error(error: reqwest::Error, timeout: Duration) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout(timeout)
        } else if error.is_builder() {
            ApiError::InvalidUrl(error.to_string())
        } else {
            ApiError::Network(error.to_string())
        }
    }

    #[async_trait]
    impl HttpTransport for ReqwestTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
            let timeout = request.timeout;
            let mut builder = self
                .client
                .request(to_reqwest_method(request.method), &request.url)
                .timeout(timeout);

            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }

            if let Some(body) = &request.body {
                let encoded = serde_json::to_string(body).map_err(|e| ApiError::Encode(e.to_string()))?;
                builder = builder.body(encoded);
            }

            let response = builder.send().await.map_err(|e| map_error(e, timeout))?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| map_error(e, timeout))?;

            Ok(ApiResponse { status, body })
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod browser {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    use async_trait::async_trait;
    use gloo_net::http::{Request, RequestBuilder};
    use gloo_timers::callback::Timeout;
    use web_sys::AbortController;

    use super::HttpTransport;
    use crate::api::error::ApiError;
    use crate::api::request::{ApiRequest, ApiResponse, Method};

    /// Browser transport backed by `fetch` through gloo-net.
    ///
    /// The timeout aborts the fetch through an `AbortController`; the timer
    /// stays armed until the body has been read.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct GlooTransport;

    impl GlooTransport {
        pub fn new() -> Self {
            Self
        }
    }

    fn request_builder(method: Method, url: &str) -> RequestBuilder {
        match method {
            Method::Get => Request::get(url),
            Method::Post => Request::post(url),
            Method::Put => Request::put(url),
            Method::Patch => Request::patch(url),
            Method::Delete => Request::delete(url),
        }
    }

    fn map_error(error: gloo_net::Error, timed_out: bool, timeout: Duration) -> ApiError {
        if timed_out {
            ApiError::Timeout(timeout)
        } else {
            ApiError::Network(error.to_string())
        }
    }

    #[async_trait(?Send)]
    impl HttpTransport for GlooTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
            let timeout = request.timeout;
            let controller = AbortController::new().map_err(|e| ApiError::Network(format!("{:?}", e)))?;
            let signal = controller.signal();

            let mut builder = request_builder(request.method, &request.url).abort_signal(Some(&signal));
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            let prepared = match &request.body {
                Some(body) => {
                    let encoded = serde_json::to_string(body).map_err(|e| ApiError::Encode(e.to_string()))?;
                    builder.body(encoded)
                }
                None => builder.build(),
            }
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;

            let timed_out = Rc::new(Cell::new(false));
            let flag = Rc::clone(&timed_out);
            let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
            let timer = Timeout::new(millis, move || {
                flag.set(true);
                controller.abort();
            });

            let response = prepared
                .send()
                .await
                .map_err(|e| map_error(e, timed_out.get(), timeout))?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| map_error(e, timed_out.get(), timeout))?;
            drop(timer);

            Ok(ApiResponse { status, body })
        }
    }
}
