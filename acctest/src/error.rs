//! Error types for acctest

/// Error type for acctest operations
#[derive(Debug, thiserror::Error)]
pub enum AcctestError {
    #[error("Template references unknown key: {0}")]
    MissingKey(String),

    #[error("Missing environment for {key}: set one of {}", vars.join(", "))]
    MissingEnvironment { key: String, vars: Vec<String> },

    #[error("Acceptance tests disabled: set TF_ACC to run them")]
    AcceptanceDisabled,

    #[error("Check failed for {address}: {message}")]
    CheckFailed { address: String, message: String },

    #[error("Invalid test case: {0}")]
    InvalidTestCase(String),

    #[error("Harness error: {0}")]
    Harness(String),

    #[error("Command '{command}' timed out after {seconds} seconds")]
    Timeout { command: String, seconds: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),
}

/// Result type alias for acctest operations
pub type Result<T> = std::result::Result<T, AcctestError>;

impl From<String> for AcctestError {
    fn from(s: String) -> Self {
        AcctestError::Custom(s)
    }
}

impl From<&str> for AcctestError {
    fn from(s: &str) -> Self {
        AcctestError::Custom(s.to_string())
    }
}
