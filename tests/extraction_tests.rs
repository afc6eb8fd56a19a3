#[cfg(test)]
mod tests {
    use medi_scan::correction::correct_name;
    use medi_scan::extraction::{extract_candidates, CandidateOrigin};
    use medi_scan::normalization::normalize_text;
    use medi_scan::section::{has_section_marker, locate_medication_section};
    use medi_scan::standardization::standardize_and_dedupe;

    #[test]
    fn test_normalization_is_idempotent() {
        let raw = "처방☆내역♥\n655504570   노바스크정  5mg\n※참고";
        let once = normalize_text(raw);
        let twice = normalize_text(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalization_preserves_line_structure() {
        let raw = "첫째 줄 내용\n둘째 줄 내용";
        let normalized = normalize_text(raw);
        assert_eq!(normalized.lines().count(), 2);
    }

    #[test]
    fn test_section_marker_tolerates_ocr_spacing() {
        assert!(has_section_marker("처방의약품의명칭"));
        assert!(has_section_marker("처 방 의 약 품 의 명 칭"));
        assert!(!has_section_marker("복약 안내"));
    }

    #[test]
    fn test_section_ends_before_equivalence_listing() {
        let text = "처방의약품의명칭\n655504570 노바스크정\n동일성분 의약품\n643210987 암로디핀정";
        let section = locate_medication_section(text);
        assert!(section.contains("노바스크정"));
        assert!(!section.contains("암로디핀정"));
    }

    #[test]
    fn test_candidates_found_across_layouts() {
        let text = "처방의약품의명칭\n655504570 톡사펜정\n(1) 레커틴정\n알도실캡슐 1일 2회";
        let candidates = extract_candidates(text);
        let origins: Vec<CandidateOrigin> = candidates.iter().map(|c| c.origin).collect();
        assert!(origins.contains(&CandidateOrigin::Code));
        assert!(origins.contains(&CandidateOrigin::Numbered));
        assert!(origins.contains(&CandidateOrigin::LineStart));
    }

    #[test]
    fn test_correction_fixes_known_misreadings() {
        assert_eq!(correct_name("노바人크정"), "노바스크정");
        assert_eq!(correct_name("트라센타"), "트라젠타");
        assert_eq!(correct_name("티지례논"), "티지페논");
        assert_eq!(correct_name("레커팅"), "레커틴정");
    }

    #[test]
    fn test_correction_leaves_unknown_names_alone() {
        assert_eq!(correct_name("가스모틴정"), "가스모틴정");
    }

    #[test]
    fn test_longest_misreading_wins() {
        // 크로미나 must be repaired as a whole, not via its 크로미 prefix.
        assert_eq!(correct_name("크로미나"), "크로미나정");
        assert_eq!(correct_name("크로미"), "크로미정");
    }

    #[test]
    fn test_standardization_is_idempotent() {
        let first = standardize_and_dedupe(["크로미나정625mg", "모티리톤", "톡사펜"].iter());
        let second = standardize_and_dedupe(first.iter());
        assert_eq!(first, second);
    }

    #[test]
    fn test_distinct_drugs_never_merge() {
        let result = standardize_and_dedupe(["노바스크정", "티지페논정", "아토렌정"].iter());
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_end_to_end_stage_chain() {
        let raw = "★조제내역★\n처 방 의 약 품 의 명 칭\n655504570 모티리톤 1일 3회\n651234567 톡사렌정 1일 2회";
        let normalized = normalize_text(raw);
        let section = locate_medication_section(&normalized);
        let corrected: Vec<String> = extract_candidates(section)
            .iter()
            .map(|candidate| correct_name(&candidate.raw_name))
            .collect();
        let medications = standardize_and_dedupe(corrected.iter());
        assert!(medications.contains(&"모티리톤정".to_string()));
        assert!(medications.contains(&"톡사렌정".to_string()));
    }
}
