use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl ScanError {
    /// True when the error was caused by caller-supplied input rather than the environment.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ScanError::InvalidUrl(_) | ScanError::InvalidConfig(_))
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
