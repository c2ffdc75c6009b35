//! Fallback policy for assessments where nothing in the catalog matched.
//!
//! An empty ranking is not an error. Callers always receive at least one explainable entry:
//! the synthetic "Unspecified Condition".

use crate::constants::{FALLBACK_CONDITION_NAME, FALLBACK_PROBABILITY, FALLBACK_SPECIALIZATION};
use crate::matcher::{display_percentage, MatchResult};
use crate::triage::AssessedCondition;

const FALLBACK_DESCRIPTION: &str = "Based on the symptoms provided, we couldn't determine a specific condition. Consider consulting a healthcare provider for a proper diagnosis.";

const FALLBACK_SELF_CARE: [&str; 4] = [
    "Rest and monitor your symptoms",
    "Stay hydrated",
    "Take over-the-counter medications for symptom relief if appropriate",
    "Consult with a healthcare provider if symptoms persist",
];

/// The synthetic condition reported when no catalog condition scored above zero.
pub fn unspecified_condition() -> AssessedCondition {
    AssessedCondition {
        name: FALLBACK_CONDITION_NAME.to_string(),
        specialization: FALLBACK_SPECIALIZATION.to_string(),
        description: FALLBACK_DESCRIPTION.to_string(),
        self_care: FALLBACK_SELF_CARE.iter().map(|s| s.to_string()).collect(),
        probability: FALLBACK_PROBABILITY,
        display_percentage: display_percentage(FALLBACK_PROBABILITY),
        matching_symptoms: Vec::new(),
        exact_matches: Vec::new(),
        partial_matches: Vec::new(),
        word_matches: Vec::new(),
    }
}

/// Convert a ranking into presentable conditions, substituting the fallback when it is empty.
pub fn apply(ranked: &[MatchResult<'_>]) -> Vec<AssessedCondition> {
    if ranked.is_empty() {
        return vec![unspecified_condition()];
    }
    ranked.iter().map(AssessedCondition::from).collect()
}

/// Whether `condition` is the synthetic fallback entry.
pub fn is_fallback(condition: &AssessedCondition) -> bool {
    condition.name == FALLBACK_CONDITION_NAME && condition.matching_symptoms.is_empty()
}
