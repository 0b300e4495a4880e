use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("App \"{0}\" not found")]
    AppNotFound(String),

    #[error("Review source rate limit hit")]
    RateLimited,

    #[error("Review source returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid review source endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Invalid continuation token: {0}")]
    InvalidToken(String),

    #[error("Review source unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SourceError>;
