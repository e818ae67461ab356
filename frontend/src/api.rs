// Re-export all API modules
pub mod client;
pub mod error;
pub mod request;
pub mod transport;
pub mod utils;

#[cfg(all(test, not(target_arch = "wasm32")))]
mod client_tests;

pub use client::ApiClient;
pub use error::ApiError;
pub use request::{ApiRequest, ApiResponse, Method};
pub use transport::HttpTransport;
#[cfg(not(target_arch = "wasm32"))]
pub use transport::ReqwestTransport;
#[cfg(target_arch = "wasm32")]
pub use transport::GlooTransport;
pub use utils::api_url;
