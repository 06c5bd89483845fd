/// Unified error handling module
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error code and message carried into the report for an unavailable object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Unknown city: {0:?}")]
    UnknownCity(String),
    #[error("Invalid orbital elements for {name}: {reason}")]
    InvalidElements { name: String, reason: String },
    #[error("Propagation failed for {name}: {reason}")]
    Propagation { name: String, reason: String },
    #[error("Event search failed: {0}")]
    Search(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("External API error: {0}")]
    ExternalApi(#[from] reqwest::Error),
}

impl AppError {
    /// Stable code for this error, as shown in report output
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::UnknownCity(_) => "UNKNOWN_CITY",
            AppError::InvalidElements { .. } => "INVALID_ELEMENTS",
            AppError::Propagation { .. } => "PROPAGATION_ERROR",
            AppError::Search(_) => "SEARCH_ERROR",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Io(_) => "IO_ERROR",
            AppError::Json(_) => "JSON_ERROR",
            AppError::ExternalApi(e) => match e.status().map(|s| s.as_u16()) {
                Some(403) => "UPSTREAM_403",
                Some(404) => "UPSTREAM_404",
                Some(429) => "UPSTREAM_429",
                Some(500..=599) => "UPSTREAM_5XX",
                _ => "UPSTREAM_ERROR",
            },
        }
    }

    pub fn detail(&self) -> ErrorDetail {
        ErrorDetail {
            code: self.code().to_string(),
            message: self.to_string(),
        }
    }

    pub fn invalid_elements(name: &str, reason: impl Into<String>) -> Self {
        AppError::InvalidElements {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Type alias for fallible operations
pub type AppResult<T> = Result<T, AppError>;
