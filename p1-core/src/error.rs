use thiserror::Error;

/// Main error type for P1 reader operations
#[derive(Error, Debug)]
pub enum P1Error {
    #[error("Source error: {0}")]
    Source(#[from] std::io::Error),

    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("Authentication failure: GCM tag verification failed")]
    AuthenticationFailure,

    #[error("Security error: {0}")]
    Security(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias for P1 reader operations
pub type P1Result<T> = Result<T, P1Error>;
