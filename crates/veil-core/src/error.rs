use thiserror::Error;

#[derive(Debug, Error)]
pub enum VeilError {
    #[error("invalid channel '{0}': must be one of: stable, edge, dev")]
    InvalidChannel(String),

    #[error("invalid version '{0}': must be a non-empty tag without whitespace or ':'")]
    InvalidVersion(String),

    #[error("home directory not found: set HOME or pass --config-dir")]
    HomeNotFound,

    #[error("required tool not found on PATH: {0}")]
    ToolNotFound(String),

    #[error("command `{command}` failed: {status}")]
    ToolFailed { command: String, status: String },

    #[error("docs directory not found: {0}")]
    DocsNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, VeilError>;
