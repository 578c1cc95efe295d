//! Text normalization, matching and similarity

pub mod recorded;
pub mod similarity;

pub use recorded::RecordedTextDetector;
pub use similarity::{ContainmentHeuristic, SequenceRatio, SimilarityMetric};

use pinpoint_core::LocateRequest;

/// Trim, and lowercase unless matching is case-sensitive
pub fn normalize(text: &str, case_sensitive: bool) -> String {
    let trimmed = text.trim();
    if case_sensitive {
        trimmed.to_string()
    } else {
        trimmed.to_lowercase()
    }
}

/// Exact or substring match of the request target against detected text
pub fn text_matches(detected: &str, request: &LocateRequest) -> bool {
    let detected = normalize(detected, request.case_sensitive);
    let target = normalize(&request.target, request.case_sensitive);

    if request.exact_match {
        detected == target
    } else {
        detected.contains(&target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_match_is_case_insensitive_by_default() {
        let req = LocateRequest::new("notepad");
        assert!(text_matches("  Open Notepad ", &req));
        assert!(!text_matches("Open Notes", &req));
    }

    #[test]
    fn test_exact_and_case_sensitive_modes() {
        let exact = LocateRequest::new("Save").exact(true);
        assert!(text_matches(" save ", &exact));
        assert!(!text_matches("Save As", &exact));

        let cased = LocateRequest::new("Save").case_sensitive(true);
        assert!(text_matches("Save As", &cased));
        assert!(!text_matches("save as", &cased));
    }
}
