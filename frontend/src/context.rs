//! Execution context for endpoint resolution.
//!
//! The resolver never touches browser globals directly. It is handed an
//! [`ExecutionContext`], which is either a server-side render (no page, no
//! storage) or a browser page with its URL and persisted store.

use std::fmt;
use std::sync::{Arc, RwLock};

use url::Url;

use crate::error::{ClientError, Result};
use crate::storage::EnvStore;

/// The page URL the client is running under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    url: Url,
}

impl PageLocation {
    pub fn parse(href: &str) -> Result<Self> {
        let url = Url::parse(href).map_err(|e| ClientError::InvalidUrl {
            url: href.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { url })
    }

    pub fn hostname(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// First value of a query parameter, percent-decoded
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// `localhost` or `127.0.0.1`
    pub fn is_loopback(&self) -> bool {
        matches!(self.hostname(), "localhost" | "127.0.0.1")
    }

    pub fn href(&self) -> &str {
        self.url.as_str()
    }
}

/// A browser page: its location plus the storage persisted for the origin.
#[derive(Clone)]
pub struct BrowserContext {
    pub location: PageLocation,
    pub storage: Arc<dyn EnvStore>,
}

impl fmt::Debug for BrowserContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserContext")
            .field("location", &self.location.href())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum ExecutionContext {
    /// Server-side execution: no document, location or storage
    Server,
    Browser(BrowserContext),
}

impl ExecutionContext {
    pub fn browser(href: &str, storage: Arc<dyn EnvStore>) -> Result<Self> {
        Ok(ExecutionContext::Browser(BrowserContext {
            location: PageLocation::parse(href)?,
            storage,
        }))
    }

    pub fn is_browser(&self) -> bool {
        matches!(self, ExecutionContext::Browser(_))
    }
}

/// Supplies the context that applies to the next request.
pub trait ContextSource: Send + Sync {
    fn current(&self) -> ExecutionContext;
}

/// A fixed context
impl ContextSource for ExecutionContext {
    fn current(&self) -> ExecutionContext {
        self.clone()
    }
}

/// A browser tab whose location changes as the user navigates.
///
/// The storage outlives navigations, so an `env` picked on one page keeps
/// applying to later pages.
pub struct BrowserSession {
    location: RwLock<PageLocation>,
    storage: Arc<dyn EnvStore>,
}

impl BrowserSession {
    pub fn open(href: &str, storage: Arc<dyn EnvStore>) -> Result<Self> {
        Ok(Self {
            location: RwLock::new(PageLocation::parse(href)?),
            storage,
        })
    }

    pub fn navigate(&self, href: &str) -> Result<()> {
        let next = PageLocation::parse(href)?;
        let mut location = self
            .location
            .write()
            .map_err(|_| ClientError::Storage("session location lock poisoned".to_string()))?;
        *location = next;
        Ok(())
    }

    pub fn location(&self) -> Option<PageLocation> {
        self.location.read().ok().map(|l| l.clone())
    }

    pub fn storage(&self) -> Arc<dyn EnvStore> {
        Arc::clone(&self.storage)
    }
}

impl ContextSource for BrowserSession {
    fn current(&self) -> ExecutionContext {
        match self.location() {
            Some(location) => ExecutionContext::Browser(BrowserContext {
                location,
                storage: self.storage(),
            }),
            // A poisoned lock leaves no usable page; resolve as if server-side
            None => ExecutionContext::Server,
        }
    }
}

/// Reads `window.location` on every request.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowContext;

#[cfg(target_arch = "wasm32")]
impl ContextSource for WindowContext {
    fn current(&self) -> ExecutionContext {
        let href = web_sys::window().and_then(|window| window.location().href().ok());
        match href.and_then(|href| PageLocation::parse(&href).ok()) {
            Some(location) => ExecutionContext::Browser(BrowserContext {
                location,
                storage: Arc::new(crate::storage::LocalStorageStore),
            }),
            None => ExecutionContext::Server,
        }
    }
}
