//! # Medication Extraction Pipeline
//!
//! Orchestrates the five stages (normalize, locate section, extract
//! candidates, correct names, standardize and deduplicate) behind a single
//! `MedicationExtractor::extract` call, and exposes a per-stage trace for
//! debugging OCR layouts that extract poorly.

use crate::correction::correct_name;
use crate::errors::{AppError, AppResult};
use crate::extraction::{extract_candidates, Candidate};
use crate::normalization::normalize_text;
use crate::section::{has_section_marker, locate_medication_section};
use crate::standardization::standardize_and_dedupe;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Tuning knobs for the extraction pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Inputs shorter than this (in chars, after normalization) are treated
    /// as failed OCR rather than run through extraction.
    pub min_text_length: usize,
    /// Corrected names longer than this are discarded as run-on matches.
    pub max_name_length: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_text_length: 10,
            max_name_length: 30,
        }
    }
}

impl ExtractionConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> AppResult<()> {
        if self.max_name_length == 0 {
            return Err(AppError::Config(
                "max_name_length must be greater than 0".to_string(),
            ));
        }
        if self.min_text_length > 10_000 {
            return Err(AppError::Config(format!(
                "min_text_length {} is implausibly large",
                self.min_text_length
            )));
        }
        Ok(())
    }
}

/// Per-stage intermediate results, for diagnostics and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionTrace {
    /// Text after noise removal and whitespace normalization
    pub normalized_text: String,
    /// Whether the medication-section marker was found (false means the
    /// extractor fell back to scanning the whole document)
    pub section_located: bool,
    /// Raw candidates from all pattern matchers
    pub candidates: Vec<Candidate>,
    /// Candidate names after OCR-error correction, pre-deduplication
    pub corrected: Vec<String>,
}

/// Result of running the pipeline over one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    /// Final standardized, deduplicated medication names in first-seen order
    pub medications: Vec<String>,
    /// Intermediate stage outputs
    pub trace: ExtractionTrace,
}

/// Extracts standardized medication names from OCR'd prescription text.
#[derive(Debug, Clone)]
pub struct MedicationExtractor {
    config: ExtractionConfig,
}

impl Default for MedicationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MedicationExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
        }
    }

    /// Create an extractor with custom configuration.
    pub fn with_config(config: ExtractionConfig) -> AppResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Run the full pipeline over raw OCR text.
    ///
    /// Never fails on the input itself: empty or implausibly short text
    /// short-circuits to an empty medication list, and text with no
    /// recognizable medications succeeds with an empty list.
    pub fn extract(&self, raw_text: &str) -> AppResult<ExtractionOutcome> {
        let started = Instant::now();

        let normalized_text = normalize_text(raw_text);
        if normalized_text.chars().count() < self.config.min_text_length {
            warn!(
                "Normalized text too short for extraction ({} chars, need {}); returning empty list",
                normalized_text.chars().count(),
                self.config.min_text_length
            );
            return Ok(ExtractionOutcome {
                medications: Vec::new(),
                trace: ExtractionTrace {
                    normalized_text,
                    section_located: false,
                    candidates: Vec::new(),
                    corrected: Vec::new(),
                },
            });
        }

        let section_located = has_section_marker(&normalized_text);
        if !section_located {
            warn!("No medication-section marker found; scanning full document");
        }
        let section = locate_medication_section(&normalized_text);

        let candidates = extract_candidates(section);
        debug!("{} candidates before correction", candidates.len());

        let corrected: Vec<String> = candidates
            .iter()
            .map(|candidate| correct_name(&candidate.raw_name))
            .filter(|name| {
                let len = name.chars().count();
                len > 0 && len <= self.config.max_name_length
            })
            .collect();

        let medications = standardize_and_dedupe(corrected.iter());

        info!(
            "Extracted {} medications from {} candidates in {:?}",
            medications.len(),
            candidates.len(),
            started.elapsed()
        );

        Ok(ExtractionOutcome {
            medications,
            trace: ExtractionTrace {
                normalized_text,
                section_located,
                candidates,
                corrected,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_prescription() -> &'static str {
        "환자명: 홍길동\n처 방 의 약 품 의 명 칭\n655504570 (한국화이자)노바스크정 5mg 1일 1회\n655612345 크로미나정625mg 1일 2회\n655698765 모티리톤 1일 3회\n동일성분 의약품 내역\n655500000 다른약정"
    }

    #[test]
    fn test_full_pipeline_on_sample() {
        let outcome = MedicationExtractor::new()
            .extract(sample_prescription())
            .unwrap();
        assert!(outcome.trace.section_located);
        assert!(outcome.medications.contains(&"노바스크정".to_string()));
        assert!(outcome.medications.contains(&"크로미나정".to_string()));
        assert!(outcome.medications.contains(&"모티리톤정".to_string()));
        // Section cut excludes everything after the end marker.
        assert!(!outcome.medications.iter().any(|m| m.contains("다른약")));
    }

    #[test]
    fn test_no_duplicates_in_output() {
        let outcome = MedicationExtractor::new()
            .extract(sample_prescription())
            .unwrap();
        let mut sorted = outcome.medications.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), outcome.medications.len());
    }

    #[test]
    fn test_short_input_yields_empty_outcome() {
        let outcome = MedicationExtractor::new().extract("짧음").unwrap();
        assert!(outcome.medications.is_empty());
        assert!(outcome.trace.candidates.is_empty());
    }

    #[test]
    fn test_missing_section_falls_back_to_full_text() {
        let text = "복용 안내문입니다\n655504570 노바스크정 5mg 아침 식후";
        let outcome = MedicationExtractor::new().extract(text).unwrap();
        assert!(!outcome.trace.section_located);
        assert!(outcome.medications.contains(&"노바스크정".to_string()));
    }

    #[test]
    fn test_deterministic_across_runs() {
        let extractor = MedicationExtractor::new();
        let first = extractor.extract(sample_prescription()).unwrap();
        let second = extractor.extract(sample_prescription()).unwrap();
        assert_eq!(first.medications, second.medications);
    }

    #[test]
    fn test_config_validation() {
        let config = ExtractionConfig {
            min_text_length: 10,
            max_name_length: 0,
        };
        assert!(MedicationExtractor::with_config(config).is_err());
        assert!(MedicationExtractor::with_config(ExtractionConfig::default()).is_ok());
    }
}
