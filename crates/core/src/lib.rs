//! # Triage Core
//!
//! Core logic for the symptom triage service.
//!
//! This crate contains pure domain operations:
//! - Condition catalog loading and validation
//! - Symptom-to-condition matching and ranking
//! - The fallback policy for unmatched symptoms
//! - Doctor directory queries and specialist recommendation
//!
//! **No API concerns**: HTTP servers, request parsing and response shaping belong in `api-rest`
//! and `api-shared`.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod demographics;
pub mod doctors;
pub mod error;
pub mod fallback;
pub mod matcher;
pub mod triage;

mod document;

pub use catalog::{Catalog, ConditionRecord};
pub use config::CoreConfig;
pub use demographics::{DemographicAdjustment, PatientProfile, Sex};
pub use doctors::{Doctor, DoctorDirectory, RankedDoctor};
pub use error::{TriageError, TriageResult};
pub use matcher::{
    display_percentage, rank_conditions, rank_conditions_for, ConditionMatcher, MatchResult,
    MatchTier,
};
pub use triage::{AssessedCondition, TriageReport, TriageRequest, TriageService};
