//! Context Refiner
//!
//! Rewrites the tip (and possibly the urgency) of a classified record using
//! extra signals in the same text. Steps run in a fixed order and a later
//! step overwrites an earlier one:
//!
//! 1. brand tip
//! 2. rain / monsoon advisory
//! 3. cold start advisory
//! 4. severity escalation (always wins)
//!
//! Title, causes and cost range are never touched.

use crate::classifier::normalize;
use crate::knowledge::{
    self, BRANDS, COLD_START_TIP, COLD_TRIGGERS, CRITICAL_PHRASES, RAIN_BRAKE_TIP,
    RAIN_START_TIP, RAIN_TRIGGERS, URGENT_TIP,
};
use crate::models::{DiagnosisRecord, IssueCategory, Urgency};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    /// Whole-word brand patterns; the gap between words may be empty,
    /// so "royalenfield" matches "royal enfield"
    static ref BRAND_PATTERNS: Vec<(&'static str, Regex)> = BRANDS
        .iter()
        .map(|brand| {
            let words: Vec<String> = brand.split_whitespace().map(regex::escape).collect();
            let pattern = format!(r"\b{}\b", words.join(r"\s*"));
            (*brand, Regex::new(&pattern).unwrap())
        })
        .collect();
    static ref RAIN: Regex = word_start_pattern(RAIN_TRIGGERS);
    static ref COLD: Regex = word_start_pattern(COLD_TRIGGERS);
}

/// Triggers anchored at a word start, so "rainy" hits but "drained" does not
fn word_start_pattern(triggers: &[&str]) -> Regex {
    let alternatives: Vec<String> = triggers.iter().map(|t| regex::escape(t)).collect();
    Regex::new(&format!(r"\b({})", alternatives.join("|"))).unwrap()
}

/// Every known brand mentioned in the text, in brand table order
pub fn detect_brands(text: &str) -> Vec<&'static str> {
    let normalized = normalize(text);

    BRAND_PATTERNS
        .iter()
        .filter(|(_, pattern)| pattern.is_match(&normalized))
        .map(|(brand, _)| *brand)
        .collect()
}

/// First known brand mentioned in the text
pub fn detect_brand(text: &str) -> Option<&'static str> {
    detect_brands(text).into_iter().next()
}

/// Whether the text contains one of the critical phrases
pub fn is_critical(text: &str) -> bool {
    let normalized = normalize(text);
    CRITICAL_PHRASES.iter().any(|p| normalized.contains(p))
}

/// Refine a record in place and hand it back.
///
/// `matched` is the knowledge base category the record came from, or `None`
/// for fallback diagnoses, in which case only severity escalation applies.
pub fn refine(
    mut record: DiagnosisRecord,
    text: &str,
    matched: Option<IssueCategory>,
) -> DiagnosisRecord {
    let normalized = normalize(text);

    if let Some(category) = matched {
        // "hero honda": the first brand with a tip for this category wins
        let brand_tip = detect_brands(&normalized)
            .into_iter()
            .find_map(|brand| knowledge::brand_tip(brand, category).map(|tip| (brand, tip)));
        if let Some((brand, tip)) = brand_tip {
            debug!(brand, %category, "Applying brand tip");
            record.tip = tip.to_string();
        }

        if RAIN.is_match(&normalized) {
            match category {
                IssueCategory::Start => record.tip = RAIN_START_TIP.to_string(),
                IssueCategory::Brake => record.tip = RAIN_BRAKE_TIP.to_string(),
                _ => {}
            }
        }

        if category == IssueCategory::Start && COLD.is_match(&normalized) {
            record.tip = COLD_START_TIP.to_string();
        }
    }

    if is_critical(&normalized) {
        debug!("Critical phrase found, escalating urgency");
        record.urgency = Urgency::High;
        record.tip = URGENT_TIP.to_string();
    }

    record
}
