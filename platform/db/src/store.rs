use async_trait::async_trait;
use reqwest::header::HeaderValue;
use serde_json::Value;

use crate::BackendResult;

/// Equality filter on a single column (`column = value`).
///
/// The value is kept as the caller supplied it; the backend coerces it to
/// the column type and rejects it if that fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Query pair in PostgREST operator syntax.
    pub(crate) fn to_query(&self) -> (String, String) {
        (self.column.clone(), format!("eq.{}", self.value))
    }
}

/// Generic row access against the backend, scoped to one caller's
/// credentials. Every method is exactly one backend round-trip.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Select `columns` from `table`, optionally narrowed by `filter`.
    /// Returns the backend's JSON result untouched.
    async fn select(&self, table: &str, columns: &str, filter: Option<&Filter>)
    -> BackendResult<Value>;

    async fn insert(&self, table: &str, payload: &Value) -> BackendResult<()>;

    async fn update(&self, table: &str, payload: &Value, filter: &Filter) -> BackendResult<()>;

    async fn delete(&self, table: &str, filter: &Filter) -> BackendResult<()>;
}

/// Builds a [`RowStore`] bound to the caller's `Authorization` header.
pub trait Connect: Send + Sync {
    fn connect(&self, authorization: Option<&HeaderValue>) -> BackendResult<Box<dyn RowStore>>;
}
