//! Constants used throughout the triage core crate.
//!
//! Scoring weights live here so the matcher, fallback and doctor ranking agree on one set of
//! numbers.

/// Weight contributed by a token equal to a canonical symptom.
pub const EXACT_MATCH_WEIGHT: f64 = 1.0;

/// Weight contributed by a token that contains, or is contained in, a canonical symptom.
pub const SUBSTRING_MATCH_WEIGHT: f64 = 0.8;

/// Upper bound of the weight contributed by word overlap; scaled by the overlapping fraction.
pub const WORD_OVERLAP_WEIGHT: f64 = 0.6;

/// Share of the balanced score taken from condition coverage.
pub const SYMPTOM_COVERAGE_WEIGHT: f64 = 0.6;

/// Share of the balanced score taken from user coverage.
pub const USER_COVERAGE_WEIGHT: f64 = 0.4;

/// Bonus multiplier applied to the exact-match ratio.
pub const EXACT_MATCH_BONUS: f64 = 0.2;

/// Multiplier for a sex-specific demographic adjustment when none is given explicitly.
pub const DEFAULT_DEMOGRAPHIC_FACTOR: f64 = 1.2;

/// Number of ranked conditions presented per assessment when none is configured.
pub const DEFAULT_MAX_RESULTS: usize = 3;

/// Oldest accepted patient age in years.
pub const MAX_PATIENT_AGE: u8 = 130;

/// Name of the synthetic condition returned when nothing in the catalog matches.
pub const FALLBACK_CONDITION_NAME: &str = "Unspecified Condition";

/// Specialisation the fallback condition routes to.
pub const FALLBACK_SPECIALIZATION: &str = "General Medicine";

/// Probability reported for the fallback condition.
pub const FALLBACK_PROBABILITY: f64 = 0.5;

/// Doctor ranking weight for the rating column.
pub const DOCTOR_RATING_WEIGHT: f64 = 0.7;

/// Doctor ranking weight for years of experience.
pub const DOCTOR_EXPERIENCE_WEIGHT: f64 = 0.3;

/// Embedded default condition catalog.
pub const BUILTIN_CATALOG_YAML: &str = include_str!("../data/conditions.yaml");
