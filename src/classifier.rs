//! Diagnostic Classifier
//!
//! Maps a free-text problem description to a diagnosis:
//! - Every knowledge base category whose keywords occur in the text is a match
//! - Multiple matches are resolved by urgency, then by canonical category order
//! - With no match, a small set of broader fallback heuristics is tried
//!
//! The returned record is always an owned copy of the template.

use crate::knowledge::{self, FALLBACK_RULES, KNOWLEDGE_BASE};
use crate::models::{Diagnosis, DiagnosisRecord, DiagnosisSource, IssueCategory};
use tracing::debug;

/// Lowercase and fold typographic apostrophes so "can’t" matches "can't"
pub fn normalize(text: &str) -> String {
    text.to_lowercase().replace('\u{2019}', "'")
}

/// Keyword-driven diagnostic classifier
pub struct DiagnosticClassifier;

impl DiagnosticClassifier {
    /// Categories whose keyword set hits the text, in canonical order
    pub fn matched_categories(text: &str) -> Vec<IssueCategory> {
        let normalized = normalize(text);
        Self::matches_in(&normalized)
    }

    fn matches_in(normalized: &str) -> Vec<IssueCategory> {
        KNOWLEDGE_BASE
            .iter()
            .filter(|entry| entry.keywords.iter().any(|kw| normalized.contains(kw)))
            .map(|entry| entry.category)
            .collect()
    }

    /// Classify a description. `None` when neither a category nor a
    /// fallback heuristic matches (including empty input).
    pub fn classify(text: &str) -> Option<Diagnosis> {
        let normalized = normalize(text);
        let mut matched = Self::matches_in(&normalized);

        if matched.is_empty() {
            return Self::fallback(&normalized);
        }

        // Stable sort keeps canonical order among equal urgencies
        matched.sort_by_key(|category| {
            std::cmp::Reverse(knowledge::entry(*category).urgency.rank())
        });

        let winner = matched[0];
        debug!(
            ?matched,
            winner = %winner,
            "Resolved diagnostic category"
        );

        Some(Diagnosis {
            source: DiagnosisSource::Category(winner),
            record: knowledge::entry(winner).to_record(),
        })
    }

    fn fallback(normalized: &str) -> Option<Diagnosis> {
        let rule = FALLBACK_RULES
            .iter()
            .find(|rule| rule.triggers.iter().any(|t| normalized.contains(t)))?;

        debug!(kind = ?rule.kind, "No category matched, using fallback heuristic");

        Some(Diagnosis {
            source: DiagnosisSource::Fallback(rule.kind),
            record: rule.to_record(),
        })
    }
}

/// Classify and return only the record
pub fn classify(text: &str) -> Option<DiagnosisRecord> {
    DiagnosticClassifier::classify(text).map(|diagnosis| diagnosis.record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FallbackKind, Urgency};

    #[test]
    fn test_single_category() {
        let cases = vec![
            ("My bike won't start", IssueCategory::Start),
            ("strange rattling from the engine", IssueCategory::Noise),
            ("the brakes are squealing", IssueCategory::Brake),
            ("oil is leaking under the engine", IssueCategory::Oil),
            ("battery keeps dying", IssueCategory::Battery),
            ("mileage has dropped a lot", IssueCategory::Mileage),
            ("handle vibrates at 60", IssueCategory::Vibration),
            ("engine is overheating in traffic", IssueCategory::Overheat),
        ];

        for (text, expected) in cases {
            let diagnosis = DiagnosticClassifier::classify(text).expect(text);
            assert_eq!(diagnosis.source, DiagnosisSource::Category(expected), "{}", text);
            assert_eq!(diagnosis.record.title, knowledge::entry(expected).title);
        }
    }

    #[test]
    fn test_case_insensitive() {
        let diagnosis = DiagnosticClassifier::classify("BRAKE PROBLEM").unwrap();
        assert_eq!(diagnosis.source.category(), Some(IssueCategory::Brake));
    }

    #[test]
    fn test_high_urgency_beats_low() {
        // mileage is low, brake is high
        let text = "mileage is poor and the brake is weak";
        assert_eq!(
            DiagnosticClassifier::matched_categories(text),
            vec![IssueCategory::Brake, IssueCategory::Mileage]
        );

        let record = classify(text).unwrap();
        assert_eq!(record.urgency, Urgency::High);
        assert_eq!(record.title, knowledge::entry(IssueCategory::Brake).title);

        // order of mention does not matter
        let record = classify("the brake is weak, also poor mileage").unwrap();
        assert_eq!(record.title, knowledge::entry(IssueCategory::Brake).title);
    }

    #[test]
    fn test_equal_urgency_first_category_wins() {
        // noise and brake are both high; noise comes first in canonical order
        let text = "brakes squeal and there is a knocking noise";
        let diagnosis = DiagnosticClassifier::classify(text).unwrap();
        assert_eq!(diagnosis.source.category(), Some(IssueCategory::Noise));

        // overheat (high) still loses to noise (high) regardless of mention order
        let diagnosis = DiagnosticClassifier::classify("overheating and knocking").unwrap();
        assert_eq!(diagnosis.source.category(), Some(IssueCategory::Noise));
    }

    #[test]
    fn test_fallback_heuristics() {
        let diagnosis = DiagnosticClassifier::classify("trouble on cold days").unwrap();
        assert_eq!(diagnosis.source, DiagnosisSource::Fallback(FallbackKind::ColdStart));

        let diagnosis = DiagnosticClassifier::classify("feels slow uphill").unwrap();
        assert_eq!(diagnosis.source, DiagnosisSource::Fallback(FallbackKind::Performance));

        let diagnosis = DiagnosticClassifier::classify("white smoke from exhaust").unwrap();
        assert_eq!(diagnosis.source, DiagnosisSource::Fallback(FallbackKind::Smoking));

        for rule in &FALLBACK_RULES {
            assert!(KNOWLEDGE_BASE.iter().all(|e| e.title != rule.title));
        }
    }

    #[test]
    fn test_fallback_only_when_no_category_matched() {
        // "cold" would trigger the fallback, but "brake" matches a category
        let diagnosis = DiagnosticClassifier::classify("cold morning and the brake is stiff").unwrap();
        assert_eq!(diagnosis.source.category(), Some(IssueCategory::Brake));
    }

    #[test]
    fn test_no_match() {
        assert!(classify("").is_none());
        assert!(classify("   ").is_none());
        assert!(classify("I like the colour blue").is_none());
        assert!(classify("🏍️🏍️ ✨").is_none());
    }

    #[test]
    fn test_deterministic() {
        let text = "noise when braking and low mileage";
        let first = DiagnosticClassifier::classify(text);
        for _ in 0..10 {
            assert_eq!(DiagnosticClassifier::classify(text), first);
        }
    }

    #[test]
    fn test_returned_records_are_independent() {
        let mut first = classify("clunking noise").unwrap();
        let second_before = classify("ticking noise").unwrap();

        first.tip = "changed".to_string();
        first.urgency = Urgency::Low;

        let second = classify("ticking noise").unwrap();
        assert_eq!(second, second_before);
        assert_eq!(second.tip, knowledge::entry(IssueCategory::Noise).tip);
    }

    #[test]
    fn test_normalize_folds_apostrophe() {
        assert_eq!(normalize("Can’t RIDE"), "can't ride");
    }
}
