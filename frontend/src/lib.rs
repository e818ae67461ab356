//! Client-side plumbing for the PICE console.
//!
//! * [`api`] - HTTP client that resolves its backend on every request
//! * [`resolver`] - environment selection and base URL policy
//! * [`context`] - explicit execution context replacing browser globals
//! * [`storage`] - persisted environment selector
//! * [`config`] - build-time and runtime API configuration
//! * [`dates`] - Korean date formatting, re-exported from `pice-shared`

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod resolver;
pub mod storage;

pub mod dates {
    pub use pice_shared::date_format::*;
}

pub use api::{ApiClient, ApiError};
pub use config::ApiConfig;
pub use context::{BrowserSession, ContextSource, ExecutionContext, PageLocation};
pub use error::{ClientError, Result};
pub use pice_shared::{Deployment, Environment};
pub use resolver::{resolve_environment, EndpointResolver, ResolvedEndpoint};
pub use storage::{EnvStore, FileStore, MemoryStore};
