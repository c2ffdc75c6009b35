//! Symptom-to-condition matching.
//!
//! Each user-reported symptom is compared with the canonical symptoms of every condition using
//! an ordered list of [`MatchTier`]s. For a given token the first tier that succeeds against any
//! canonical symptom of the condition wins; lower tiers are not consulted for that token. Within
//! a tier the first canonical symptom in catalog order is taken.
//!
//! Per condition the matched canonical symptoms are combined into a probability:
//!
//! ```text
//! symptom_coverage = |matched| / |condition symptoms|
//! user_coverage    = |matched| / |user symptoms|
//! balanced         = 0.6 * symptom_coverage + 0.4 * user_coverage
//! bonus            = 0.2 * |exact matches| / |user symptoms|
//! probability      = (balanced + bonus) * demographic factor
//! ```
//!
//! The probability is not clamped; an exact match on every symptom scores 1.2. Use
//! [`display_percentage`] when presenting it.
//!
//! Matching is pure: no I/O, no shared state, identical inputs give identical output.

use crate::catalog::{Catalog, ConditionRecord};
use crate::constants::{
    EXACT_MATCH_BONUS, EXACT_MATCH_WEIGHT, SUBSTRING_MATCH_WEIGHT, SYMPTOM_COVERAGE_WEIGHT,
    USER_COVERAGE_WEIGHT, WORD_OVERLAP_WEIGHT,
};
use crate::demographics::{demographic_factor, PatientProfile};
use serde::Serialize;

/// One way of relating a user token to a canonical symptom, in descending confidence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Token equals the canonical symptom.
    Exact,
    /// One contains the other.
    Substring,
    /// Some words overlap; weighted by the overlapping fraction.
    WordOverlap,
}

impl MatchTier {
    /// Tiers in the order they are tried.
    pub const PRIORITY: [MatchTier; 3] =
        [MatchTier::Exact, MatchTier::Substring, MatchTier::WordOverlap];

    /// Weight contributed when `token` matches `canonical` under this tier.
    ///
    /// Both arguments must already be lower-cased. Returns `None` when the tier does not match.
    pub fn weigh(self, token: &str, canonical: &str) -> Option<f64> {
        match self {
            MatchTier::Exact => (token == canonical).then_some(EXACT_MATCH_WEIGHT),
            MatchTier::Substring => (canonical.contains(token) || token.contains(canonical))
                .then_some(SUBSTRING_MATCH_WEIGHT),
            MatchTier::WordOverlap => {
                let canonical_words: Vec<&str> = canonical.split_whitespace().collect();
                let token_words: Vec<&str> = token.split_whitespace().collect();

                let overlap = canonical_words
                    .iter()
                    .filter(|&&word| {
                        token_words
                            .iter()
                            .any(|&user_word| user_word.contains(word) || word.contains(user_word))
                    })
                    .count();
                if overlap == 0 {
                    return None;
                }

                let longest = canonical_words.len().max(token_words.len());
                Some(WORD_OVERLAP_WEIGHT * overlap as f64 / longest as f64)
            }
        }
    }

    /// Whether this tier may claim a canonical symptom already matched by an earlier token.
    fn may_rematch(self) -> bool {
        !matches!(self, MatchTier::WordOverlap)
    }
}

/// Score of one condition against the user's symptoms.
///
/// Symptom lists hold canonical spellings borrowed from the catalog.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchResult<'a> {
    pub condition: &'a ConditionRecord,

    /// Raw, unclamped probability used for ranking.
    pub probability: f64,

    /// Sum of the tier weights of every matched token.
    pub weighted_matches: f64,

    /// Distinct canonical symptoms matched, in first-match order.
    pub matching_symptoms: Vec<&'a str>,

    pub exact_matches: Vec<&'a str>,
    pub partial_matches: Vec<&'a str>,
    pub word_matches: Vec<&'a str>,
}

impl MatchResult<'_> {
    /// Probability as a whole percentage, clamped to 0..=100.
    pub fn display_percentage(&self) -> u8 {
        display_percentage(self.probability)
    }

    /// Canonical symptoms matched by `tier`.
    pub fn matches_for(&self, tier: MatchTier) -> &[&str] {
        match tier {
            MatchTier::Exact => &self.exact_matches,
            MatchTier::Substring => &self.partial_matches,
            MatchTier::WordOverlap => &self.word_matches,
        }
    }
}

/// Clamp a raw probability to `[0, 1]` and express it as a rounded percentage.
pub fn display_percentage(probability: f64) -> u8 {
    (probability.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Lower-case user input for comparison.
///
/// Tokens are not trimmed and blank tokens are kept: each one counts towards user coverage.
/// Callers that accept free text should clean it first, as [`TriageService::assess`] does.
///
/// [`TriageService::assess`]: crate::TriageService::assess
pub fn normalize_symptoms<S: AsRef<str>>(user_symptoms: &[S]) -> Vec<String> {
    user_symptoms
        .iter()
        .map(|s| s.as_ref().to_lowercase())
        .collect()
}

/// Matches user symptoms against conditions with an ordered list of tiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionMatcher {
    tiers: Vec<MatchTier>,
}

impl Default for ConditionMatcher {
    fn default() -> Self {
        Self {
            tiers: MatchTier::PRIORITY.to_vec(),
        }
    }
}

impl ConditionMatcher {
    /// Matcher using every tier in [`MatchTier::PRIORITY`] order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Matcher restricted to `tiers`, tried in the given order.
    pub fn with_tiers(tiers: impl IntoIterator<Item = MatchTier>) -> Self {
        Self {
            tiers: tiers.into_iter().collect(),
        }
    }

    pub fn tiers(&self) -> &[MatchTier] {
        &self.tiers
    }

    /// Score one condition against normalised tokens (see [`normalize_symptoms`]).
    ///
    /// Returns `None` when nothing matched, when `tokens` is empty, or when the condition has
    /// no canonical symptoms.
    pub fn score<'a>(
        &self,
        tokens: &[String],
        condition: &'a ConditionRecord,
    ) -> Option<MatchResult<'a>> {
        if tokens.is_empty() || condition.symptoms.is_empty() {
            return None;
        }

        let canonical: Vec<(&'a str, String)> = condition
            .symptoms
            .iter()
            .map(|symptom| (symptom.as_str(), symptom.folded()))
            .collect();

        let mut weighted_matches = 0.0;
        let mut matching_symptoms: Vec<&'a str> = Vec::new();
        let mut exact_matches = Vec::new();
        let mut partial_matches = Vec::new();
        let mut word_matches = Vec::new();

        for token in tokens {
            let hit = self.tiers.iter().find_map(|&tier| {
                canonical
                    .iter()
                    .filter(|(symptom, _)| {
                        tier.may_rematch() || !matching_symptoms.contains(symptom)
                    })
                    .find_map(|(symptom, folded)| {
                        tier.weigh(token, folded).map(|weight| (tier, *symptom, weight))
                    })
            });

            let Some((tier, symptom, weight)) = hit else {
                continue;
            };

            tracing::trace!(
                condition = %condition.name,
                token = token.as_str(),
                symptom,
                ?tier,
                weight,
                "symptom matched"
            );

            weighted_matches += weight;
            if !matching_symptoms.contains(&symptom) {
                matching_symptoms.push(symptom);
            }
            match tier {
                MatchTier::Exact => exact_matches.push(symptom),
                MatchTier::Substring => partial_matches.push(symptom),
                MatchTier::WordOverlap => word_matches.push(symptom),
            }
        }

        if matching_symptoms.is_empty() {
            return None;
        }

        let user_count = tokens.len() as f64;
        let matched = matching_symptoms.len() as f64;
        let symptom_coverage = matched / condition.symptoms.len() as f64;
        let user_coverage = matched / user_count;
        let balanced =
            SYMPTOM_COVERAGE_WEIGHT * symptom_coverage + USER_COVERAGE_WEIGHT * user_coverage;
        let exact_bonus = if exact_matches.is_empty() {
            0.0
        } else {
            exact_matches.len() as f64 / user_count * EXACT_MATCH_BONUS
        };

        Some(MatchResult {
            condition,
            probability: balanced + exact_bonus,
            weighted_matches,
            matching_symptoms,
            exact_matches,
            partial_matches,
            word_matches,
        })
    }

    /// Rank `conditions` against `user_symptoms`.
    ///
    /// Returns every condition with a positive probability, highest first. Ties keep catalog
    /// order. Empty input or an empty condition list yields an empty vector.
    pub fn rank<'a, S: AsRef<str>>(
        &self,
        user_symptoms: &[S],
        conditions: &'a [ConditionRecord],
    ) -> Vec<MatchResult<'a>> {
        self.rank_with(user_symptoms, conditions, |_| 1.0)
    }

    /// Like [`ConditionMatcher::rank`], applying the catalog's demographic adjustments for
    /// `profile`.
    pub fn rank_catalog<'a, S: AsRef<str>>(
        &self,
        user_symptoms: &[S],
        catalog: &'a Catalog,
        profile: Option<&PatientProfile>,
    ) -> Vec<MatchResult<'a>> {
        match profile {
            Some(profile) if !catalog.adjustments().is_empty() => {
                self.rank_with(user_symptoms, catalog.conditions(), |condition| {
                    demographic_factor(catalog.adjustments(), condition, profile)
                })
            }
            _ => self.rank(user_symptoms, catalog.conditions()),
        }
    }

    fn rank_with<'a, S, F>(
        &self,
        user_symptoms: &[S],
        conditions: &'a [ConditionRecord],
        factor: F,
    ) -> Vec<MatchResult<'a>>
    where
        S: AsRef<str>,
        F: Fn(&ConditionRecord) -> f64,
    {
        let tokens = normalize_symptoms(user_symptoms);
        if tokens.is_empty() || conditions.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<MatchResult<'a>> = conditions
            .iter()
            .filter_map(|condition| self.score(&tokens, condition))
            .map(|mut result| {
                result.probability *= factor(result.condition);
                result
            })
            .filter(|result| result.probability > 0.0)
            .collect();

        // `sort_by` is stable, so equal probabilities keep catalog order.
        ranked.sort_by(|a, b| b.probability.total_cmp(&a.probability));

        for result in &ranked {
            tracing::debug!(
                condition = %result.condition.name,
                probability = result.probability,
                weighted_matches = result.weighted_matches,
                matched = result.matching_symptoms.len(),
                "ranked condition"
            );
        }

        ranked
    }
}

/// Rank `conditions` against `user_symptoms` with the default tiers.
pub fn rank_conditions<'a, S: AsRef<str>>(
    user_symptoms: &[S],
    conditions: &'a [ConditionRecord],
) -> Vec<MatchResult<'a>> {
    ConditionMatcher::default().rank(user_symptoms, conditions)
}

/// Rank a catalog for a specific patient, applying demographic adjustments.
pub fn rank_conditions_for<'a, S: AsRef<str>>(
    user_symptoms: &[S],
    catalog: &'a Catalog,
    profile: &PatientProfile,
) -> Vec<MatchResult<'a>> {
    ConditionMatcher::default().rank_catalog(user_symptoms, catalog, Some(profile))
}
