use thiserror::Error;

/// Core error type for aihub.
/// Internally, modules can use `anyhow::Result<T>` for convenience,
/// but public boundaries should expose `CoreResult<T>` with this error.
#[derive(Debug, Error)]
pub enum AiHubError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("rate limited by registry {registry}")]
    RateLimited {
        registry: String,
        retry_after: Option<u64>,
    },

    #[error("registry unavailable: {registry}")]
    RegistryUnavailable { registry: String },

    #[error("upstream error from {registry}: {code} {message}")]
    RegistryError {
        registry: String,
        code: String,
        message: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type CoreResult<T> = std::result::Result<T, AiHubError>;
