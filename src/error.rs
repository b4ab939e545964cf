use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required column '{column}' in {table} table")]
    MissingColumn { table: String, column: String },

    #[error("Duplicate cross-reference ids: {}", .ids.join(", "))]
    DuplicateCrossReference { ids: Vec<String> },

    #[error("Name service error: {0}")]
    NameService(#[from] NameServiceError),
}

/// Failures talking to the taxonomic name-matching service.
#[derive(Error, Debug)]
pub enum NameServiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Name service responded with status {0}")]
    Status(u16),

    #[error("Malformed name service response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No matches returned for '{0}'")]
    NoMatches(String),

    #[error("scientificScore '{0}' is not a number in [0, 1]")]
    InvalidScore(String),

    #[error("Invalid name service URL {0}")]
    InvalidUrl(String),
}

impl NameServiceError {
    /// Transport failures and server-side errors are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            NameServiceError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            NameServiceError::Status(code) => *code >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrationError>;
