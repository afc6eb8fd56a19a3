//! # Section Locator
//!
//! Narrows the normalized text down to the region that enumerates prescribed
//! medications. Korean prescriptions label this region "처방의약품의 명칭"
//! and close it with the duplicate-ingredient disclosure ("동일성분") or the
//! injectable section ("주사제").
//!
//! OCR routinely injects spurious spaces inside Korean words, so the start
//! marker tolerates arbitrary whitespace between its syllables. When no
//! marker is present at all the whole text is returned: losing the section
//! heading must never mean losing every medication on the page.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

/// Markers that terminate the medication section.
pub const SECTION_END_MARKERS: &[&str] = &["동일성분", "주사제"];

lazy_static! {
    static ref SECTION_START: Regex =
        Regex::new(r"처\s*방\s*의\s*약\s*품\s*의\s*명\s*칭")
            .expect("section start pattern should be valid");
}

/// True when the text carries the medication-section heading.
pub fn has_section_marker(text: &str) -> bool {
    SECTION_START.is_match(text)
}

/// Locate the medication section of `text`.
///
/// Returns the slice from the start marker up to (excluding) the first end
/// marker that follows it, or to end-of-text. Without a start marker the full
/// input is returned unchanged.
///
/// # Examples
///
/// ```rust
/// use medi_scan::section::locate_medication_section;
///
/// let text = "처방의약품의 명칭\n노바스크정\n동일성분 중복처방";
/// assert_eq!(locate_medication_section(text), "처방의약품의 명칭\n노바스크정\n");
/// assert_eq!(locate_medication_section("아무 표식 없음"), "아무 표식 없음");
/// ```
pub fn locate_medication_section(text: &str) -> &str {
    let Some(start) = SECTION_START.find(text) else {
        debug!("No medication section marker found, scanning full text");
        return text;
    };

    let tail = &text[start.end()..];
    let end_offset = SECTION_END_MARKERS
        .iter()
        .filter_map(|marker| tail.find(marker))
        .min();

    let section = match end_offset {
        Some(offset) => &text[start.start()..start.end() + offset],
        None => &text[start.start()..],
    };
    debug!(
        "Medication section located: {} of {} chars",
        section.len(),
        text.len()
    );
    section
}
