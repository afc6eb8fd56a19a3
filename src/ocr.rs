//! # Document OCR Client
//!
//! Async client for the Upstage document-digitization API. Uploads a scanned
//! prescription as multipart form data, joins the per-page text into one
//! document string, and wraps the call in retry-with-backoff plus a circuit
//! breaker so a flaky upstream degrades gracefully.

use crate::circuit_breaker::CircuitBreaker;
use crate::config::AppConfig;
use crate::errors::{error_logging, AppError, AppResult};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One recognized page in the OCR response.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrPage {
    #[serde(default)]
    pub text: String,
}

/// Response envelope from the document-digitization endpoint.
///
/// Multi-page documents carry per-page text in `pages`; single-page
/// responses may only populate the top-level `text` field.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrResponse {
    #[serde(default)]
    pub pages: Vec<OcrPage>,
    #[serde(default)]
    pub text: String,
}

/// Join per-page text into one document, skipping blank pages.
///
/// Falls back to the top-level `text` field when the response carries no
/// usable page entries.
pub fn join_pages(response: &OcrResponse) -> String {
    let joined: Vec<&str> = response
        .pages
        .iter()
        .map(|page| page.text.trim())
        .filter(|text| !text.is_empty())
        .collect();
    if joined.is_empty() {
        response.text.trim().to_string()
    } else {
        joined.join("\n")
    }
}

/// Calculate retry delay in milliseconds with exponential backoff and jitter.
///
/// `delay = min(base * 2^(attempt-1), max) + random(0, delay/4)`
pub fn calculate_retry_delay(attempt: u32, recovery: &crate::config::RecoveryConfig) -> u64 {
    #[allow(clippy::cast_precision_loss)]
    let base_delay = recovery.base_retry_delay_ms as f64;

    let exponential_delay = base_delay * (2.0_f64).powf(attempt.saturating_sub(1) as f64);

    #[allow(clippy::cast_precision_loss)]
    let delay = exponential_delay.min(recovery.max_retry_delay_ms as f64) as u64;

    // Jitter prevents thundering herd; guard the modulus for tiny delays.
    let jitter = rand::random::<u64>() % (delay / 4).max(1);
    delay + jitter
}

/// Client for the Upstage OCR service.
pub struct OcrClient {
    http: reqwest::Client,
    config: AppConfig,
    breaker: CircuitBreaker,
}

impl OcrClient {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.recovery.operation_timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;
        let breaker = CircuitBreaker::new(&config.recovery);
        Ok(Self {
            http,
            config,
            breaker,
        })
    }

    /// Run OCR over a scanned document and return the joined page text.
    ///
    /// Retries transient failures with exponential backoff. Fails fast when
    /// the circuit breaker is open or the document exceeds the size limit.
    pub async fn recognize(&self, document: Vec<u8>, file_name: &str) -> AppResult<String> {
        if document.is_empty() {
            return Err(AppError::Validation("document is empty".to_string()));
        }
        if document.len() as u64 > self.config.max_document_size {
            return Err(AppError::Validation(format!(
                "document size {} exceeds limit of {} bytes",
                document.len(),
                self.config.max_document_size
            )));
        }
        if self.breaker.is_open() {
            return Err(AppError::Ocr(
                "circuit breaker open, OCR service unavailable".to_string(),
            ));
        }

        let document_size = document.len();
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self
                .request_once(document.clone(), file_name.to_string())
                .await
            {
                Ok(text) => {
                    self.breaker.record_success();
                    info!(
                        "OCR succeeded on attempt {} ({} chars from {} bytes)",
                        attempt,
                        text.chars().count(),
                        document_size
                    );
                    return Ok(text);
                }
                Err(err) => {
                    self.breaker.record_failure();
                    if attempt >= self.config.recovery.max_retries {
                        error_logging::log_ocr_error(
                            &err,
                            "ocr_recognize",
                            Some(document_size as u64),
                            Some(attempt),
                        );
                        return Err(err);
                    }
                    let delay_ms = calculate_retry_delay(attempt, &self.config.recovery);
                    warn!("OCR attempt {attempt} failed: {err}. Retrying in {delay_ms}ms");
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }

    async fn request_once(&self, document: Vec<u8>, file_name: String) -> AppResult<String> {
        let part = reqwest::multipart::Part::bytes(document).file_name(file_name);
        let form = reqwest::multipart::Form::new()
            .part("document", part)
            .text("model", self.config.ocr_model.clone());

        let response = self
            .http
            .post(&self.config.ocr_endpoint)
            .bearer_auth(&self.config.upstage_api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("OCR request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Ocr(format!(
                "OCR service returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: OcrResponse = response
            .json()
            .await
            .map_err(|e| AppError::Ocr(format!("malformed OCR response: {e}")))?;
        debug!("OCR response carried {} pages", parsed.pages.len());
        Ok(join_pages(&parsed))
    }
}
