use thiserror::Error;

/// Main error type for LexFold
#[derive(Error, Debug)]
pub enum LexfoldError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document parse errors (malformed XML)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Dataset serialization errors
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Invalid input (e.g. zero folds requested)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using LexfoldError
pub type Result<T> = std::result::Result<T, LexfoldError>;
