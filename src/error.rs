#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl CartError {
    /// Whether the error came from the remote service (transport failure or
    /// a non-success response) rather than local validation or storage.
    pub fn is_remote(&self) -> bool {
        matches!(self, CartError::Http(_) | CartError::Remote { .. })
    }
}

pub type Result<T> = std::result::Result<T, CartError>;
