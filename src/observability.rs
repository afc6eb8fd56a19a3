//! Tracing setup and metrics recording helpers.
//!
//! Structured logging goes through `tracing` with pretty output for
//! development and JSON for production (selected by `LOG_FORMAT`). Pipeline
//! and HTTP-client metrics are emitted through the `metrics` facade; whether
//! they go anywhere depends on the exporter the embedding service installs.

use anyhow::Result;
use std::time::Duration;
use tracing_subscriber::prelude::*;

/// Initialize structured logging.
///
/// Filter directives come from `RUST_LOG`, defaulting to `info` for this
/// crate. `LOG_FORMAT=pretty` switches from JSON to human-readable output.
pub fn init_tracing() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("medi_scan=info".parse()?);

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();
    }

    tracing::info!(log_format = %log_format, "Tracing initialized");
    Ok(())
}

/// Record one run of the extraction pipeline.
pub fn record_extraction_metrics(
    duration: Duration,
    input_chars: usize,
    candidate_count: usize,
    medication_count: usize,
) {
    metrics::counter!("extraction_runs_total").increment(1);
    metrics::histogram!("extraction_duration_seconds").record(duration.as_secs_f64());
    metrics::histogram!("extraction_input_chars").record(input_chars as f64);
    metrics::histogram!("extraction_candidates").record(candidate_count as f64);
    metrics::histogram!("extraction_medications").record(medication_count as f64);
}

/// Record one OCR request, successful or not.
pub fn record_ocr_metrics(success: bool, duration: Duration, document_size: usize) {
    metrics::counter!("ocr_operations_total", "result" => if success { "success" } else { "failure" })
        .increment(1);
    metrics::histogram!("ocr_duration_seconds").record(duration.as_secs_f64());
    metrics::histogram!("ocr_document_size_bytes").record(document_size as f64);
}

/// Record one drug-safety registry lookup.
pub fn record_registry_metrics(info_types_found: usize, duration: Duration) {
    metrics::counter!("registry_lookups_total").increment(1);
    metrics::histogram!("registry_lookup_duration_seconds").record(duration.as_secs_f64());
    metrics::histogram!("registry_info_types_found").record(info_types_found as f64);
}

/// Record document cache effectiveness.
pub fn record_cache_metrics(hit: bool) {
    metrics::counter!("document_cache_requests_total", "result" => if hit { "hit" } else { "miss" })
        .increment(1);
}
