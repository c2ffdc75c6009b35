//! Patient demographics and the demographic score adjustments that depend on them.
//!
//! Adjustments are an extension point: a catalog may declare that a condition's probability is
//! multiplied by a factor for patients of a given sex. The built-in catalog declares none.

use crate::catalog::ConditionRecord;
use crate::constants::MAX_PATIENT_AGE;
use crate::{TriageError, TriageResult};
use serde::{Deserialize, Serialize};
use triage_types::NonEmptyText;

/// Patient sex as captured before symptom entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
        }
    }
}

impl std::str::FromStr for Sex {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            other => Err(TriageError::InvalidInput(format!(
                "unknown sex '{other}' (expected male or female)"
            ))),
        }
    }
}

/// Basic information collected about the patient.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub age: Option<u8>,
    pub sex: Option<Sex>,
}

impl PatientProfile {
    /// Build a profile, rejecting implausible ages.
    pub fn new(age: Option<u8>, sex: Option<Sex>) -> TriageResult<Self> {
        if let Some(age) = age {
            if age > MAX_PATIENT_AGE {
                return Err(TriageError::InvalidInput(format!(
                    "age {age} exceeds maximum of {MAX_PATIENT_AGE}"
                )));
            }
        }
        Ok(Self { age, sex })
    }
}

/// Multiplicative boost applied to one condition for patients of one sex.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DemographicAdjustment {
    condition: NonEmptyText,
    sex: Sex,
    factor: f64,
}

impl DemographicAdjustment {
    /// Create an adjustment. `factor` must be finite and strictly positive.
    pub fn new(condition: impl AsRef<str>, sex: Sex, factor: f64) -> TriageResult<Self> {
        let condition = NonEmptyText::new(condition)?;
        if !factor.is_finite() || factor <= 0.0 {
            return Err(TriageError::InvalidCatalog(format!(
                "adjustment for '{condition}' has invalid factor {factor}"
            )));
        }
        Ok(Self {
            condition,
            sex,
            factor,
        })
    }

    pub fn condition(&self) -> &str {
        self.condition.as_str()
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Whether this adjustment targets `condition` for a patient described by `profile`.
    pub fn applies_to(&self, condition: &ConditionRecord, profile: &PatientProfile) -> bool {
        profile.sex == Some(self.sex) && condition.name.matches_ignore_case(self.condition.as_str())
    }
}

/// Combined factor of every adjustment that applies; `1.0` when none do.
pub fn demographic_factor(
    adjustments: &[DemographicAdjustment],
    condition: &ConditionRecord,
    profile: &PatientProfile,
) -> f64 {
    adjustments
        .iter()
        .filter(|adjustment| adjustment.applies_to(condition, profile))
        .map(DemographicAdjustment::factor)
        .product()
}
