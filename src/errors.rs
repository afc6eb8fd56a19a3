//! # Application Error Types
//!
//! This module defines common error types used throughout the medi-scan
//! application. The extraction pipeline itself degrades instead of erroring
//! (see the pipeline module); these types cover the I/O edges: configuration,
//! the OCR service, and the drug-safety registry.

use std::fmt;

/// General application error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration validation errors
    Config(String),
    /// Input validation errors (missing arguments, unusable text, etc.)
    Validation(String),
    /// OCR service errors
    Ocr(String),
    /// Network/communication errors
    Network(String),
    /// Internal application errors
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            AppError::Validation(msg) => write!(f, "[VALIDATION] {}", msg),
            AppError::Ocr(msg) => write!(f, "[OCR] {}", msg),
            AppError::Network(msg) => write!(f, "[NETWORK] {}", msg),
            AppError::Internal(msg) => write!(f, "[INTERNAL] {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON parsing failed: {}", err))
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Standardized error logging utilities for consistent error reporting across the application
pub mod error_logging {
    use tracing::error;

    /// Log OCR service errors with request context
    pub fn log_ocr_error(
        error: &impl std::fmt::Display,
        operation: &str,
        image_size: Option<u64>,
        attempt_count: Option<u32>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            image_size_bytes = ?image_size,
            attempt_count = ?attempt_count,
            "OCR processing failed"
        );
    }

    /// Log drug-safety registry errors with endpoint context
    pub fn log_registry_error(
        error: &impl std::fmt::Display,
        operation: &str,
        endpoint: Option<&str>,
        search_name: Option<&str>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            endpoint = ?endpoint,
            search_name = ?search_name,
            "Drug-safety registry lookup failed"
        );
    }

    /// Log extraction pipeline degradation with stage context
    pub fn log_pipeline_error(error: &impl std::fmt::Display, stage: &str, input_len: usize) {
        error!(
            error = %error,
            stage = %stage,
            input_len = %input_len,
            "Extraction stage degraded to its safe default"
        );
    }

    /// Log configuration errors during startup/initialization
    pub fn log_config_error(error: &impl std::fmt::Display, config_key: &str, operation: &str) {
        error!(
            error = %error,
            config_key = %config_key,
            operation = %operation,
            "Configuration error"
        );
    }
}
