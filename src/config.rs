//! # Application Configuration
//!
//! Configuration structures for the OCR client, the drug-safety registry
//! client, and retry/recovery behavior, loaded from environment variables
//! (`.env` supported via dotenvy) and validated before use.

use crate::errors::{AppError, AppResult};
use std::env;

pub const DEFAULT_OCR_ENDPOINT: &str = "https://api.upstage.ai/v1/document-digitization";
pub const DEFAULT_OCR_MODEL: &str = "ocr";
pub const DEFAULT_DUR_BASE_URL: &str = "http://apis.data.go.kr/1471000/DURPrdlstInfoService03";
pub const MAX_DOCUMENT_SIZE: u64 = 10 * 1024 * 1024; // 10MB limit for scanned documents

/// Recovery configuration for transient-failure handling.
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
    /// Timeout for a single HTTP operation in seconds
    pub operation_timeout_secs: u64,
    /// Circuit breaker failure threshold
    pub circuit_breaker_threshold: u32,
    /// Circuit breaker reset timeout in seconds
    pub circuit_breaker_reset_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_retry_delay_ms: 1000,  // 1 second
            max_retry_delay_ms: 10000,  // 10 seconds
            operation_timeout_secs: 30, // 30 seconds
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_secs: 60, // 1 minute
        }
    }
}

impl RecoveryConfig {
    /// Validate recovery configuration parameters
    pub fn validate(&self) -> AppResult<()> {
        if self.max_retries == 0 {
            return Err(AppError::Config(
                "max_retries must be greater than 0".to_string(),
            ));
        }
        if self.base_retry_delay_ms == 0 {
            return Err(AppError::Config(
                "base_retry_delay_ms must be greater than 0".to_string(),
            ));
        }
        if self.max_retry_delay_ms < self.base_retry_delay_ms {
            return Err(AppError::Config(format!(
                "max_retry_delay_ms ({}) must be >= base_retry_delay_ms ({})",
                self.max_retry_delay_ms, self.base_retry_delay_ms
            )));
        }
        if self.operation_timeout_secs == 0 {
            return Err(AppError::Config(
                "operation_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.circuit_breaker_threshold == 0 {
            return Err(AppError::Config(
                "circuit_breaker_threshold must be greater than 0".to_string(),
            ));
        }
        if self.circuit_breaker_reset_secs == 0 {
            return Err(AppError::Config(
                "circuit_breaker_reset_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bearer token for the document OCR API
    pub upstage_api_key: String,
    /// OCR endpoint URL
    pub ocr_endpoint: String,
    /// OCR model identifier sent with each request
    pub ocr_model: String,
    /// Service key for the public drug-safety (DUR) registry
    pub dur_api_key: Option<String>,
    /// Base URL for the DUR registry
    pub dur_base_url: String,
    /// Maximum accepted document size in bytes
    pub max_document_size: u64,
    /// Retry and circuit-breaker settings shared by both HTTP clients
    pub recovery: RecoveryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upstage_api_key: String::new(),
            ocr_endpoint: DEFAULT_OCR_ENDPOINT.to_string(),
            ocr_model: DEFAULT_OCR_MODEL.to_string(),
            dur_api_key: None,
            dur_base_url: DEFAULT_DUR_BASE_URL.to_string(),
            max_document_size: MAX_DOCUMENT_SIZE,
            recovery: RecoveryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// `UPSTAGE_API_KEY` is required; everything else falls back to defaults.
    /// Call [`AppConfig::validate`] before using the result.
    pub fn from_env() -> AppResult<Self> {
        let upstage_api_key = env::var("UPSTAGE_API_KEY")
            .map_err(|_| AppError::Config("UPSTAGE_API_KEY must be set".to_string()))?;

        let mut config = Self {
            upstage_api_key,
            ..Self::default()
        };

        if let Ok(endpoint) = env::var("OCR_ENDPOINT") {
            config.ocr_endpoint = endpoint;
        }
        if let Ok(model) = env::var("OCR_MODEL") {
            config.ocr_model = model;
        }
        if let Ok(key) = env::var("DUR_API_KEY") {
            config.dur_api_key = Some(key);
        }
        if let Ok(base_url) = env::var("DUR_BASE_URL") {
            config.dur_base_url = base_url;
        }
        if let Ok(max_retries) = env::var("MAX_RETRIES") {
            config.recovery.max_retries = max_retries.parse().map_err(|_| {
                AppError::Config(format!("MAX_RETRIES '{}' is not a number", max_retries))
            })?;
        }
        if let Ok(timeout) = env::var("OPERATION_TIMEOUT_SECS") {
            config.recovery.operation_timeout_secs = timeout.parse().map_err(|_| {
                AppError::Config(format!(
                    "OPERATION_TIMEOUT_SECS '{}' is not a number",
                    timeout
                ))
            })?;
        }

        Ok(config)
    }

    /// Validate application configuration parameters
    pub fn validate(&self) -> AppResult<()> {
        if self.upstage_api_key.trim().is_empty() {
            return Err(AppError::Config(
                "upstage_api_key cannot be empty".to_string(),
            ));
        }
        if !self.ocr_endpoint.starts_with("http") {
            return Err(AppError::Config(format!(
                "ocr_endpoint '{}' is not an HTTP URL",
                self.ocr_endpoint
            )));
        }
        if self.ocr_model.trim().is_empty() {
            return Err(AppError::Config("ocr_model cannot be empty".to_string()));
        }
        if !self.dur_base_url.starts_with("http") {
            return Err(AppError::Config(format!(
                "dur_base_url '{}' is not an HTTP URL",
                self.dur_base_url
            )));
        }
        if self.max_document_size == 0 {
            return Err(AppError::Config(
                "max_document_size must be greater than 0".to_string(),
            ));
        }
        self.recovery.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(unused_assignments)]
    fn test_recovery_config_validation() {
        let mut config = RecoveryConfig::default();
        assert!(config.validate().is_ok());

        config.max_retries = 0;
        assert!(config.validate().is_err());
        config.max_retries = 3;

        config.base_retry_delay_ms = 0;
        assert!(config.validate().is_err());
        config.base_retry_delay_ms = 1000;

        config.max_retry_delay_ms = 500;
        assert!(config.validate().is_err());
        config.max_retry_delay_ms = 10000;

        config.circuit_breaker_threshold = 0;
        assert!(config.validate().is_err());
        config.circuit_breaker_threshold = 5;
    }

    #[test]
    fn test_app_config_requires_api_key() {
        let config = AppConfig::default();
        assert!(config.validate().is_err());

        let config = AppConfig {
            upstage_api_key: "up_test_key".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_config_rejects_bad_urls() {
        let config = AppConfig {
            upstage_api_key: "up_test_key".to_string(),
            ocr_endpoint: "ftp://example.com".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_defaults_point_at_production_endpoints() {
        let config = AppConfig::default();
        assert_eq!(config.ocr_endpoint, DEFAULT_OCR_ENDPOINT);
        assert_eq!(config.ocr_model, "ocr");
        assert!(config.dur_base_url.contains("DURPrdlstInfoService"));
    }
}
