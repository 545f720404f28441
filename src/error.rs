use std::fmt;

#[derive(Debug)]
pub enum TransactionLensError {
    IoError(std::io::Error),
    ConfigError(String),
    AnalysisError(String),
    FetchError(String),
    CacheError(String),
    InvalidInput(String),
}

impl TransactionLensError {
    /// The bare message, without the kind prefix used by `Display`.
    pub fn message(&self) -> String {
        match self {
            TransactionLensError::IoError(err) => err.to_string(),
            TransactionLensError::ConfigError(msg)
            | TransactionLensError::AnalysisError(msg)
            | TransactionLensError::FetchError(msg)
            | TransactionLensError::CacheError(msg)
            | TransactionLensError::InvalidInput(msg) => msg.clone(),
        }
    }
}

impl std::error::Error for TransactionLensError {}

impl fmt::Display for TransactionLensError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TransactionLensError::IoError(err) => write!(f, "IO error: {}", err),
            TransactionLensError::ConfigError(err) => write!(f, "Configuration error: {}", err),
            TransactionLensError::AnalysisError(err) => write!(f, "Analysis error: {}", err),
            TransactionLensError::FetchError(err) => write!(f, "Fetch error: {}", err),
            TransactionLensError::CacheError(err) => write!(f, "Cache error: {}", err),
            TransactionLensError::InvalidInput(err) => write!(f, "Invalid input: {}", err),
        }
    }
}

impl From<serde_json::Error> for TransactionLensError {
    fn from(err: serde_json::Error) -> Self {
        TransactionLensError::CacheError(err.to_string())
    }
}

impl From<std::io::Error> for TransactionLensError {
    fn from(err: std::io::Error) -> Self {
        TransactionLensError::IoError(err)
    }
}

impl From<toml::de::Error> for TransactionLensError {
    fn from(err: toml::de::Error) -> Self {
        TransactionLensError::ConfigError(err.to_string())
    }
}
