//! # medi-scan
//!
//! Extracts medication names from OCR'd Korean prescription scans.
//!
//! The core is a five-stage text pipeline: normalize the raw OCR text,
//! locate the prescription's medication section, extract name candidates
//! with layout-specific pattern matchers, correct recurring OCR
//! misreadings, then standardize and deduplicate into canonical drug names.
//! Around it sit an async client for the Upstage document OCR service, a
//! client for the Korean DUR drug-safety registry, and a fingerprint-keyed
//! document cache.
//!
//! ```
//! use medi_scan::MedicationExtractor;
//!
//! let extractor = MedicationExtractor::new();
//! let outcome = extractor
//!     .extract("처 방 의 약 품 의 명 칭\n655504570 노바스크정 5mg 1일 1회 아침 식후")
//!     .unwrap();
//! assert_eq!(outcome.medications, vec!["노바스크정".to_string()]);
//! ```

pub mod cache;
pub mod circuit_breaker;
pub mod config;
pub mod correction;
pub mod dur;
pub mod errors;
pub mod extraction;
pub mod normalization;
pub mod observability;
pub mod ocr;
pub mod pipeline;
pub mod section;
pub mod standardization;

pub use errors::{AppError, AppResult};
pub use pipeline::{ExtractionConfig, ExtractionOutcome, ExtractionTrace, MedicationExtractor};
