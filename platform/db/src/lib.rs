//! Backend data primitives: per-request settings, the row store seam and
//! its REST implementation.

mod rest;
mod store;

use std::{fmt, sync::Arc};

use reqwest::StatusCode;
use thiserror::Error;

pub use rest::{RestClient, RestConnector};
pub use store::{Connect, Filter, RowStore};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend url is required")]
    MissingUrl,
    #[error("backend anon key is required")]
    MissingAnonKey,
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
    #[error("invalid backend anon key")]
    InvalidAnonKey,
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    /// Error reported by the backend itself; displays as its message only.
    #[error("{message}")]
    Api {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Looks up a setting by name; unset names yield `None`.
pub type Lookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Names of the variables holding the backend location and key, plus where
/// to read them from (the process environment unless overridden).
///
/// Values are resolved on every call to [`BackendSettings::resolve`], never
/// cached, so a rotated key is picked up by the next request.
#[derive(Clone)]
pub struct BackendSettings {
    url_key: String,
    anon_key_key: String,
    lookup: Lookup,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self::new("SUPABASE_URL", "SUPABASE_ANON_KEY")
    }
}

impl fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendSettings")
            .field("url_key", &self.url_key)
            .field("anon_key_key", &self.anon_key_key)
            .finish_non_exhaustive()
    }
}

/// Backend location and key as read at request time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendEndpoint {
    pub url: String,
    pub anon_key: String,
}

impl BackendSettings {
    pub fn new(url_key: impl Into<String>, anon_key_key: impl Into<String>) -> Self {
        Self {
            url_key: url_key.into(),
            anon_key_key: anon_key_key.into(),
            lookup: Arc::new(|name| std::env::var(name).ok()),
        }
    }

    /// Read values through `lookup` instead of the process environment.
    pub fn with_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.lookup = Arc::new(lookup);
        self
    }

    /// Read the current values; unset variables read as empty strings.
    pub fn resolve(&self) -> BackendEndpoint {
        BackendEndpoint {
            url: (self.lookup)(&self.url_key).unwrap_or_default(),
            anon_key: (self.lookup)(&self.anon_key_key).unwrap_or_default(),
        }
    }
}
