use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from the terminal or local files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Transport-level HTTP failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The session is missing or expired; the user must log in again.
    #[error("Not logged in")]
    Unauthorized,

    /// A response body could not be decoded.
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A name path no longer resolves in the folder tree.
    #[error("Unable to traverse back down tree: {0}")]
    TreePath(String),

    /// User input rejected before any request was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The configured server URL cannot be used.
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
}

impl AppError {
    /// Whether the error means the user has to log in before retrying.
    pub fn needs_login(&self) -> bool {
        matches!(self, AppError::Unauthorized)
    }
}
