use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZipDifferError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed archive: {0}")]
    MalformedArchive(String),

    #[error("Unsupported archive: {0}")]
    UnsupportedArchive(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Formatting failed: {0}")]
    Format(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Comparison error: {0}")]
    Comparison(String),
}

pub type Result<T> = std::result::Result<T, ZipDifferError>;
