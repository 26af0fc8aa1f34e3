//! Errors raised while handling a request

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum ServerError {
    /// Nothing lives at this path (stored without the leading slash)
    #[error("Not found: /{0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServerError {
    pub fn not_found(path: &str) -> Self {
        ServerError::NotFound(path.trim_matches('/').to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServerError::NotFound(_))
    }
}
