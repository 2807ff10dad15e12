use anyhow::{Context, Result};
use platform_db::BackendSettings;

const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Which environment variables hold the backend URL and anon key.
    /// Their values are read per request, not here.
    pub backend: BackendSettings,
    /// Largest request body accepted for create and update, in bytes.
    pub body_limit: usize,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Ok(Self {
            backend: BackendSettings::default(),
            body_limit: body_limit(std::env::var("EMPLOYEES_BODY_LIMIT").ok())?,
        })
    }
}

fn body_limit(raw: Option<String>) -> Result<usize> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .with_context(|| format!("invalid EMPLOYEES_BODY_LIMIT {raw:?}")),
        None => Ok(DEFAULT_BODY_LIMIT),
    }
}
