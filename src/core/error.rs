//! Error types for the search session engine.
//!
//! Transport failures are also reflected in the session phase
//! (`Failed`); the error value carries the detail for callers that
//! want to react programmatically.

use thiserror::Error;

/// Result type alias for search operations
pub type Result<T> = std::result::Result<T, SearchError>;

/// Main error type for the search engine
#[derive(Error, Debug)]
pub enum SearchError {
    /// All filter fields were blank, nothing was sent to the index.
    #[error("Empty query not executed: at least one filter must be non-blank")]
    EmptyQueryNotExecuted,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// Navigation was attempted without a boundary sort key.
    #[error("Cursor unavailable: {0}")]
    CursorUnavailable(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid index response: {0}")]
    InvalidResponse(String),

    #[error("Index error: {0}")]
    IndexError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::Transport(err.to_string())
    }
}

impl From<tantivy::TantivyError> for SearchError {
    fn from(err: tantivy::TantivyError) -> Self {
        SearchError::IndexError(err.to_string())
    }
}

impl SearchError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Failures of the round trip to the index (move a session to `Failed`)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SearchError::Transport(_)
                | SearchError::Timeout(_)
                | SearchError::InvalidResponse(_)
                | SearchError::IndexError(_)
        )
    }

    /// Programming-contract failures that should never reach a user
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, SearchError::CursorUnavailable(_))
    }

    /// Signals that carry no failure at all
    pub fn is_no_op(&self) -> bool {
        matches!(self, SearchError::EmptyQueryNotExecuted)
    }
}
