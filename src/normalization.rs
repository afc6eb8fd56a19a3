//! # Text Normalizer
//!
//! First stage of the extraction pipeline: cleans raw OCR output so the
//! downstream pattern matchers see predictable text.
//!
//! - Noise characters are replaced by spaces and whitespace runs collapsed
//! - Lines that trim to one character or less are dropped
//! - Prose lines get NFKC normalization to repair Korean syllable blocks the
//!   OCR engine emitted in decomposed form; lines carrying digits are treated
//!   as structured codes and kept verbatim
//!
//! Normalization is best-effort and total: it always returns a usable string
//! and never propagates an error to the caller.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // Everything outside word chars, whitespace and the punctuation OCR gets
    // right often enough to be worth keeping.
    static ref NOISE_CHARS: Regex =
        Regex::new(r"[^\w\s.,()/%-]+").expect("noise character pattern should be valid");
    // Horizontal whitespace only; newlines delimit lines and must survive.
    static ref INLINE_WHITESPACE: Regex =
        Regex::new(r"[^\S\n]+").expect("inline whitespace pattern should be valid");
}

/// Normalize raw OCR text line by line.
///
/// Lines containing a decimal digit (prescription codes, dosages, patient
/// numbers) are preserved exactly as scanned; altering them would corrupt the
/// coded-name matcher input. All other lines are NFKC-composed.
///
/// # Examples
///
/// ```rust
/// use medi_scan::normalization::normalize_text;
///
/// let normalized = normalize_text("노바스크정  5mg\n*\n처방전");
/// assert_eq!(normalized, "노바스크정 5mg\n처방전");
/// ```
pub fn normalize_text(text: &str) -> String {
    let stripped = NOISE_CHARS.replace_all(text, " ");

    let mut lines: Vec<String> = Vec::new();
    for line in stripped.lines() {
        let collapsed = INLINE_WHITESPACE.replace_all(line, " ");
        let trimmed = collapsed.trim();
        if trimmed.chars().count() <= 1 {
            trace!("Dropping noise line: '{}'", trimmed);
            continue;
        }

        if trimmed.chars().any(|c| c.is_ascii_digit()) {
            // Structured code line, keep verbatim.
            lines.push(trimmed.to_string());
        } else {
            lines.push(trimmed.nfkc().collect());
        }
    }

    let normalized = lines.join("\n");
    debug!(
        "Normalized OCR text: {} -> {} chars, {} lines kept",
        text.len(),
        normalized.len(),
        lines.len()
    );
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_characters_become_spaces() {
        assert_eq!(normalize_text("노바스크정***5mg"), "노바스크정 5mg");
    }

    #[test]
    fn test_whitespace_collapsed_per_line() {
        let normalized = normalize_text("처방전   내역\n약품   목록");
        assert_eq!(normalized, "처방전 내역\n약품 목록");
    }

    #[test]
    fn test_short_lines_dropped() {
        let normalized = normalize_text("가\n※\n의약품 목록");
        assert_eq!(normalized, "의약품 목록");
    }

    #[test]
    fn test_code_lines_kept_verbatim() {
        // Digit-bearing lines must not be recomposed or otherwise touched.
        let line = "655504570 노바스크정 5mg";
        assert_eq!(normalize_text(line), line);
    }

    #[test]
    fn test_decomposed_hangul_recomposed() {
        // NFD-decomposed jamo sequence for "약품" must come back composed.
        let decomposed = "\u{110B}\u{1163}\u{11A8} \u{1111}\u{116E}\u{11B7} 이름";
        let normalized = normalize_text(decomposed);
        assert_eq!(normalized, "약 품 이름");
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_kept_punctuation_survives() {
        let normalized = normalize_text("리피토정 (한미) 10/20%");
        assert_eq!(normalized, "리피토정 (한미) 10/20%");
    }
}
