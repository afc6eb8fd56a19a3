//! # Candidate Extractor
//!
//! Runs an ordered set of independent pattern matchers over the medication
//! section and unions their results. Each matcher targets one layout quirk of
//! scanned Korean prescriptions: nine-digit product codes, bare suffixed
//! names, known name prefixes, bracketed indices, and line-start name runs.
//!
//! The matchers are data, not control flow: a static table of
//! (origin, regex, anchoring) entries, so adding a layout means adding a row.
//! Origin tags travel with each candidate for diagnostics only and never
//! influence ranking.

use crate::correction::DOSAGE_PATTERN;
use crate::standardization::STANDARD_SUFFIXES;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Substrings that mark a match as administrative metadata, not a drug name.
pub const REJECT_MARKERS: &[&str] = &["사유코드", "코드"];

/// Name prefixes common enough on Korean prescriptions to rescue fragments
/// the structural matchers miss.
pub const NAME_PREFIXES: &[&str] = &[
    "크로", "트라", "노바", "티지", "아토", "피오", "라미", "네시", "메트", "글리", "아스",
    "카나", "리", "엔", "코", "다", "자",
];

/// Which pattern matcher produced a candidate. Diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateOrigin {
    /// Nine-digit product code followed by a name
    Code,
    /// Bare name ending in a standard-form suffix
    Name,
    /// Name starting with a known medication prefix
    Prefix,
    /// Line-start bracketed index followed by a name
    Numbered,
    /// Bracketed code group followed by a name
    Bracket,
    /// Name run anchored at the start of a physical line
    LineStart,
}

/// An unvalidated medication-name extraction from one matcher.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    /// Matcher that produced this candidate
    pub origin: CandidateOrigin,
    /// Uncorrected surface form, dosage-stripped
    pub raw_name: String,
}

struct NamePattern {
    origin: CandidateOrigin,
    regex: Regex,
    name_group: usize,
    /// Match per physical line, anchored at line start, instead of over the
    /// whole section.
    line_anchored: bool,
}

fn suffix_alternation() -> String {
    STANDARD_SUFFIXES.join("|")
}

fn build_patterns() -> Vec<NamePattern> {
    let sfx = suffix_alternation();
    let prefixes = NAME_PREFIXES.join("|");

    let table: Vec<(CandidateOrigin, String, usize, bool)> = vec![
        // Nine-digit product code, optional parenthetical maker, then name.
        (
            CandidateOrigin::Code,
            format!(r"(\d{{9}})\s+(?:\([가-힣A-Za-z]+\))?([\w가-힣A-Za-z]+(?:{sfx})?)"),
            2,
            false,
        ),
        // Bare suffixed name after start-of-text or whitespace.
        (
            CandidateOrigin::Name,
            format!(r"(?:^|\s)(?:\([가-힣A-Za-z]+\))?((?:[가-힣A-Za-z]{{2,}})+(?:{sfx}))"),
            1,
            false,
        ),
        // Fragment rescued by a known name prefix.
        (
            CandidateOrigin::Prefix,
            format!(r"(?:^|\s)(?:\([가-힣A-Za-z]+\))?((?:{prefixes})[가-힣A-Za-z]+)"),
            1,
            false,
        ),
        // Line-start "(n)" index followed by a name.
        (
            CandidateOrigin::Numbered,
            format!(r"(?m)^\s*\(\s*([0-9]+)\s*\)\s*([가-힣A-Za-z]+(?:{sfx})?)"),
            2,
            false,
        ),
        // Bracketed code anywhere, e.g. "(65730340)크로미나정625mg".
        (
            CandidateOrigin::Bracket,
            format!(r"\(\s*(\d+)\s*\)\s*([가-힣A-Za-z]+(?:{sfx})?)"),
            2,
            false,
        ),
        // One or more concatenated name+suffix tokens at the line start.
        (
            CandidateOrigin::LineStart,
            format!(r"^\s*([가-힣A-Za-z]+(?:{sfx}))+"),
            1,
            true,
        ),
    ];

    table
        .into_iter()
        .map(|(origin, pattern, name_group, line_anchored)| NamePattern {
            origin,
            regex: Regex::new(&pattern).expect("candidate pattern should be valid"),
            name_group,
            line_anchored,
        })
        .collect()
}

lazy_static! {
    static ref PATTERNS: Vec<NamePattern> = build_patterns();
}

/// Extract every medication-name candidate from the section text.
///
/// All matchers run independently and cumulatively; results are unioned with
/// (origin, name) deduplication in first-seen order, which keeps repeated
/// calls deterministic. Candidates of char-length ≤ 1 and matches that locked
/// onto administrative metadata are rejected.
pub fn extract_candidates(section: &str) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut seen: HashSet<(CandidateOrigin, String)> = HashSet::new();

    for pattern in PATTERNS.iter() {
        if pattern.line_anchored {
            for line in section.lines() {
                if let Some(caps) = pattern.regex.captures(line) {
                    push_candidate(
                        &mut candidates,
                        &mut seen,
                        pattern.origin,
                        caps.get(pattern.name_group).map(|m| m.as_str()),
                    );
                }
            }
        } else {
            for caps in pattern.regex.captures_iter(section) {
                push_candidate(
                    &mut candidates,
                    &mut seen,
                    pattern.origin,
                    caps.get(pattern.name_group).map(|m| m.as_str()),
                );
            }
        }
    }

    debug!(
        "Extracted {} unique candidates from {} chars of section text",
        candidates.len(),
        section.len()
    );
    candidates
}

fn push_candidate(
    candidates: &mut Vec<Candidate>,
    seen: &mut HashSet<(CandidateOrigin, String)>,
    origin: CandidateOrigin,
    matched: Option<&str>,
) {
    let Some(matched) = matched else { return };

    let raw_name = DOSAGE_PATTERN
        .replace_all(matched.trim(), "")
        .trim()
        .to_string();

    if raw_name.chars().count() <= 1 {
        return;
    }
    if REJECT_MARKERS.iter().any(|marker| raw_name.contains(marker)) {
        trace!("Rejected metadata match: '{}'", raw_name);
        return;
    }

    if seen.insert((origin, raw_name.clone())) {
        trace!("Candidate [{:?}] '{}'", origin, raw_name);
        candidates.push(Candidate { origin, raw_name });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names_of(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.raw_name.as_str()).collect()
    }

    #[test]
    fn test_coded_name_matcher() {
        let candidates = extract_candidates("655504570 노바스크정 5mg");
        assert!(candidates
            .iter()
            .any(|c| c.origin == CandidateOrigin::Code && c.raw_name == "노바스크정"));
    }

    #[test]
    fn test_bare_name_matcher() {
        let candidates = extract_candidates("복용약 모티리톤정 식후");
        assert!(names_of(&candidates).contains(&"모티리톤정"));
    }

    #[test]
    fn test_prefix_matcher_rescues_fragment() {
        // No suffix, no code: only the prefix table catches this.
        let candidates = extract_candidates("아침 트라젠타듀 저녁");
        assert!(candidates
            .iter()
            .any(|c| c.origin == CandidateOrigin::Prefix && c.raw_name == "트라젠타듀"));
    }

    #[test]
    fn test_bracketed_code_matcher() {
        let candidates = extract_candidates("내역 (65730340)크로미나정625mg 1일");
        assert!(candidates
            .iter()
            .any(|c| c.origin == CandidateOrigin::Bracket && c.raw_name == "크로미나정"));
    }

    #[test]
    fn test_numbered_line_matcher() {
        let candidates = extract_candidates("( 1 ) 인데놀정\n( 2 ) 크래밍정");
        let numbered: Vec<_> = candidates
            .iter()
            .filter(|c| c.origin == CandidateOrigin::Numbered)
            .collect();
        assert_eq!(numbered.len(), 2);
    }

    #[test]
    fn test_line_start_matcher() {
        let candidates = extract_candidates("톡사펜정 1일 3회\n식후 30분");
        assert!(candidates
            .iter()
            .any(|c| c.origin == CandidateOrigin::LineStart && c.raw_name == "톡사펜정"));
    }

    #[test]
    fn test_dosage_stripped_from_candidates() {
        let candidates = extract_candidates("655504570 아토렌정20mg");
        for candidate in &candidates {
            assert!(!candidate.raw_name.contains("mg"), "{:?}", candidate);
        }
    }

    #[test]
    fn test_metadata_matches_rejected() {
        let candidates = extract_candidates("655504570 사유코드정");
        assert!(candidates.is_empty(), "{:?}", candidates);
    }

    #[test]
    fn test_single_char_names_rejected() {
        for candidate in extract_candidates("123456789 정") {
            assert!(candidate.raw_name.chars().count() > 1);
        }
    }

    #[test]
    fn test_union_deduplicates_per_origin() {
        let candidates = extract_candidates("노바스크정 노바스크정");
        let bare: Vec<_> = candidates
            .iter()
            .filter(|c| c.origin == CandidateOrigin::Name)
            .collect();
        assert_eq!(bare.len(), 1);
    }

    #[test]
    fn test_empty_section_yields_nothing() {
        assert!(extract_candidates("").is_empty());
    }

    #[test]
    fn test_deterministic_order() {
        let text = "655504570 노바스크정 5mg\n(1) 크로미나정\n모티리톤정";
        assert_eq!(extract_candidates(text), extract_candidates(text));
    }
}
