//! # Standardizer & Deduplicator
//!
//! Final stage of the extraction pipeline. Takes corrected candidate names
//! and produces the canonical, ordered, duplicate-free medication list:
//!
//! 1. every name gets exactly one standard dosage-form suffix ("정" by default)
//! 2. combination products missing their marker token regain it
//! 3. near-duplicates are snapped onto the verified whitelist spelling
//! 4. a recall safeguard stops over-aggressive merging from collapsing a
//!    multi-drug prescription into a single entry
//!
//! This stage never fails; when nothing usable remains it returns an empty
//! list and the caller reports "no medication recognized".

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, trace};

/// Dosage-form suffixes a canonical name may end with. "주사액" is listed
/// before "액" so the longer form matches first.
pub const STANDARD_SUFFIXES: &[&str] =
    &["정", "캡슐", "주사액", "시럽", "겔", "크림", "액", "패치"];

/// Suffix appended when OCR dropped the dosage form entirely.
pub const DEFAULT_SUFFIX: &str = "정";

/// Verified canonical medication names used to snap near-duplicates.
pub const WHITELIST: &[&str] = &[
    "노바스크정",
    "티지페논정",
    "아토렌정",
    "피오글리정",
    "트라젠타듀오정",
    "크로미나정",
    "크로미정",
    "톡사펜정",
    "톡사렌정",
    "알도실캡슐",
    "알리나제정",
    "레커틴정",
    "크래밍정",
    "스티렌투엑스정",
    "모티리톤정",
    "인데놀정",
];

/// A combination product whose marker token OCR tends to drop.
#[derive(Debug, Clone, Copy)]
pub struct CombinationRule {
    /// Base ingredient token that identifies the product.
    pub base: &'static str,
    /// Marker token a faithful reading must carry.
    pub marker: &'static str,
}

/// Known combination products. The table is explicit and finite; nothing here
/// is inferred.
pub const COMBINATION_RULES: &[CombinationRule] = &[CombinationRule {
    base: "트라젠타",
    marker: "듀오",
}];

lazy_static! {
    static ref SUFFIX_END: Regex = Regex::new(&format!("(?:{})$", STANDARD_SUFFIXES.join("|")))
        .expect("standard suffix pattern should be valid");
}

/// True when `name` already ends in a standard dosage-form suffix.
pub fn ends_with_standard_suffix(name: &str) -> bool {
    SUFFIX_END.is_match(name)
}

/// Apply the default-suffix and combination-product rules to one name.
fn apply_standard_form(name: &str) -> String {
    let mut name = name.trim().to_string();

    if !ends_with_standard_suffix(&name) {
        name.push_str(DEFAULT_SUFFIX);
    }

    for rule in COMBINATION_RULES {
        if name.contains(rule.base) && !name.contains(rule.marker) {
            let combined = format!("{}{}", rule.base, rule.marker);
            let restored = name.replace(rule.base, &combined);
            trace!("Restored combination marker: '{}' -> '{}'", name, restored);
            name = restored;
        }
    }

    name
}

/// Collapse a doubled trailing suffix ("알리나제정정" → "알리나제정"), an
/// artifact of appending the default suffix to a fragment that already
/// carried one.
fn repair_doubled_suffix(name: &str) -> String {
    for suffix in STANDARD_SUFFIXES {
        let doubled = format!("{suffix}{suffix}");
        if let Some(stem) = name.strip_suffix(doubled.as_str()) {
            return format!("{stem}{suffix}");
        }
    }
    name.to_string()
}

/// Canonicalize, deduplicate and order corrected candidate names.
///
/// Order of the result is insertion order: whitelist-direct hits and
/// safeguard entries are never re-sorted. Idempotent on its own output.
///
/// # Examples
///
/// ```rust
/// use medi_scan::standardization::standardize_and_dedupe;
///
/// let names = ["노바스크", "노바스크정", "모티리톤"];
/// assert_eq!(standardize_and_dedupe(&names), vec!["노바스크정", "모티리톤정"]);
/// ```
pub fn standardize_and_dedupe<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let prepared: Vec<String> = names
        .into_iter()
        .map(|name| apply_standard_form(name.as_ref()))
        .collect();

    let mut canonical: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for name in &prepared {
        if WHITELIST.contains(&name.as_str()) {
            if seen.insert(name.clone()) {
                canonical.push(name.clone());
            }
            continue;
        }

        let repaired = repair_doubled_suffix(name);
        if let Some(std_name) = WHITELIST
            .iter()
            .find(|entry| repaired.contains(**entry) || entry.contains(repaired.as_str()))
        {
            trace!("Whitelist snap: '{}' -> '{}'", repaired, std_name);
            if seen.insert((*std_name).to_string()) {
                canonical.push((*std_name).to_string());
            }
        } else if repaired.chars().count() > 2 {
            // Legitimate name absent from the whitelist, keep its own form.
            if seen.insert(repaired.clone()) {
                canonical.push(repaired);
            }
        }
    }

    // Recall safeguard: a single over-aggressive merge must not turn a
    // multi-drug prescription into one entry.
    if canonical.len() < 2 && !prepared.is_empty() {
        debug!(
            "Recall safeguard engaged: {} canonical from {} candidates",
            canonical.len(),
            prepared.len()
        );
        if seen.insert(prepared[0].clone()) {
            canonical.push(prepared[0].clone());
        }
        for name in &prepared[1..] {
            if *name != prepared[0] {
                if seen.insert(name.clone()) {
                    canonical.push(name.clone());
                }
                break;
            }
        }
    }

    debug!(
        "Standardized {} candidates into {} canonical names",
        prepared.len(),
        canonical.len()
    );
    canonical
}
