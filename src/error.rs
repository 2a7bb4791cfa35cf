use thiserror::Error;

/// Analytics error types.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Insufficient data: need {required} bars, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AnalysisError {
    /// Shorthand for a length gate failure.
    pub fn insufficient(required: usize, actual: usize) -> Self {
        AnalysisError::InsufficientData { required, actual }
    }

    /// True when the error only reflects a short history.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, AnalysisError::InsufficientData { .. })
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
