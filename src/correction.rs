//! # Name Corrector
//!
//! Repairs the medication-name surface forms the OCR engine reliably gets
//! wrong. Corrections are data, not code: a fixed table of wrong-form →
//! right-form substring replacements, scanned in declared order with the
//! first hit winning. Within a drug family the longer wrong-forms are listed
//! before their prefixes so "크로미나" is matched before "크로미".
//!
//! The table is closed-world: only names it knows about are repaired, and
//! unknown names pass through with just dosage and digit remnants stripped.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

/// Known OCR misreads of medication names, scanned in order, first match wins.
pub const CORRECTION_TABLE: &[(&str, &str)] = &[
    ("노바人크", "노바스크"),
    ("노H스크", "노바스크"),
    ("노바스코", "노바스크"),
    ("트라젠E", "트라젠타"),
    ("트라센타", "트라젠타"),
    ("트라전타", "트라젠타"),
    ("티지패논", "티지페논"),
    ("티지례논", "티지페논"),
    ("타피페논", "티지페논"),
    ("아토맨", "아토렌"),
    ("아토렌지", "아토렌"),
    ("피오글리치", "피오글리"),
    ("피아글리", "피오글리"),
    ("크로미나", "크로미나정"),
    ("크로미", "크로미정"),
    ("크로나", "크로미정"),
    ("톡사펜", "톡사펜정"),
    ("톡사렌", "톡사렌정"),
    ("알도실", "알도실캡슐"),
    ("알리나제", "알리나제정"),
    ("레커틴", "레커틴정"),
    ("레커팅", "레커틴정"),
    ("크래밍", "크래밍정"),
    ("스티렌투엑스", "스티렌투엑스정"),
    ("모티리톤", "모티리톤정"),
    ("인데놀", "인데놀정"),
];

lazy_static! {
    /// Dosage substrings like "625mg" or "62.5mg" left over from OCR.
    pub(crate) static ref DOSAGE_PATTERN: Regex =
        Regex::new(r"\d+\.\d+mg|\d+mg").expect("dosage pattern should be valid");
    static ref DIGITS: Regex = Regex::new(r"\d+").expect("digit pattern should be valid");
}

/// Correct one raw candidate name.
///
/// Pure and total: trims, strips the dosage substring, applies at most one
/// correction-table replacement, then removes any remaining decimal digits.
/// A name the table does not know comes back only dosage/digit-stripped.
///
/// # Examples
///
/// ```rust
/// use medi_scan::correction::correct_name;
///
/// assert_eq!(correct_name("노바人크정"), "노바스크정");
/// assert_eq!(correct_name("인데놀 40mg"), "인데놀정");
/// assert_eq!(correct_name("미지의약품정"), "미지의약품정");
/// ```
pub fn correct_name(raw_name: &str) -> String {
    let mut name = DOSAGE_PATTERN
        .replace_all(raw_name.trim(), "")
        .trim()
        .to_string();

    for (wrong, right) in CORRECTION_TABLE {
        if name.contains(wrong) {
            let replaced = name.replace(wrong, right);
            trace!("Corrected name: '{}' -> '{}'", name, replaced);
            name = replaced;
            break;
        }
    }

    DIGITS.replace_all(&name, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_misreads_corrected() {
        assert_eq!(correct_name("노바人크"), "노바스크");
        assert_eq!(correct_name("트라센타"), "트라젠타");
        assert_eq!(correct_name("티지례논"), "티지페논");
        assert_eq!(correct_name("레커팅"), "레커틴정");
    }

    #[test]
    fn test_longer_form_wins_within_family() {
        // "크로미나" must not be clobbered by the shorter "크로미" entry.
        assert_eq!(correct_name("크로미나"), "크로미나정");
        assert_eq!(correct_name("크로미"), "크로미정");
    }

    #[test]
    fn test_single_correction_only() {
        // First hit stops the scan; the result is not re-scanned.
        let corrected = correct_name("노바스코");
        assert_eq!(corrected, "노바스크");
    }

    #[test]
    fn test_dosage_and_digits_stripped() {
        assert_eq!(correct_name("크로미나정625mg"), "크로미나정정");
        assert_eq!(correct_name("아토렌 20mg"), "아토렌");
        assert_eq!(correct_name("인데놀10"), "인데놀정");
    }

    #[test]
    fn test_decimal_dosage_stripped_whole() {
        assert_eq!(correct_name("톡사펜 62.5mg"), "톡사펜정");
    }

    #[test]
    fn test_unknown_name_passes_through() {
        assert_eq!(correct_name("  게보린정 "), "게보린정");
    }

    #[test]
    fn test_empty_name_stays_empty() {
        assert_eq!(correct_name(""), "");
    }
}
