//! Doctor directory and specialist recommendation.
//!
//! The directory is loaded once from a YAML/JSON file and never mutated. A recommendation
//! resolves the condition's specialization through the condition catalog, keeps doctors in the
//! requested city with that specialization, and orders them by
//! `rating * 0.7 + experience * 0.3`.

use crate::catalog::Catalog;
use crate::constants::{DOCTOR_EXPERIENCE_WEIGHT, DOCTOR_RATING_WEIGHT};
use crate::document::{self, DocumentFormat};
use crate::{TriageError, TriageResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use triage_types::NonEmptyText;

/// A doctor listed in the directory.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Doctor {
    pub name: NonEmptyText,
    pub specialization: NonEmptyText,
    pub city: NonEmptyText,
    /// Patient rating, typically 0-5.
    pub rating: f64,
    /// Years of experience.
    pub experience: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospital: Option<String>,
}

impl Doctor {
    /// Create a validated doctor entry.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::InvalidDoctor`] if a text field is blank, or rating/experience are
    /// negative or not finite.
    pub fn new(
        name: impl AsRef<str>,
        specialization: impl AsRef<str>,
        city: impl AsRef<str>,
        rating: f64,
        experience: f64,
        hospital: Option<String>,
    ) -> TriageResult<Self> {
        let name = NonEmptyText::new(name)
            .map_err(|_| TriageError::InvalidDoctor("doctor name cannot be empty".into()))?;
        let specialization = NonEmptyText::new(specialization).map_err(|_| {
            TriageError::InvalidDoctor(format!("doctor '{name}' has an empty specialization"))
        })?;
        let city = NonEmptyText::new(city)
            .map_err(|_| TriageError::InvalidDoctor(format!("doctor '{name}' has an empty city")))?;

        for (field, value) in [("rating", rating), ("experience", experience)] {
            if !value.is_finite() || value < 0.0 {
                return Err(TriageError::InvalidDoctor(format!(
                    "doctor '{name}' has invalid {field} {value}"
                )));
            }
        }

        Ok(Self {
            name,
            specialization,
            city,
            rating,
            experience,
            hospital: hospital.filter(|h| !h.trim().is_empty()),
        })
    }

    /// Ranking score used for recommendations.
    pub fn score(&self) -> f64 {
        self.rating * DOCTOR_RATING_WEIGHT + self.experience * DOCTOR_EXPERIENCE_WEIGHT
    }
}

/// A doctor paired with their recommendation score.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedDoctor {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub score: f64,
}

/// Immutable list of doctors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DoctorDirectory {
    doctors: Vec<Doctor>,
}

impl DoctorDirectory {
    pub fn new(doctors: Vec<Doctor>) -> Self {
        Self { doctors }
    }

    /// Parse a directory from YAML (or JSON) text.
    pub fn parse(text: &str) -> TriageResult<Self> {
        let wire: DirectoryWire = document::decode(text, DocumentFormat::Yaml, "doctor directory")?;
        wire_to_domain(wire)
    }

    /// Load a directory file; `.json` files are parsed as JSON, anything else as YAML.
    pub fn load(path: &Path) -> TriageResult<Self> {
        let text = document::read(path)?;
        let wire: DirectoryWire = document::decode(
            &text,
            DocumentFormat::from_path(path),
            "doctor directory",
        )?;
        let directory = wire_to_domain(wire)?;
        tracing::info!(
            path = %path.display(),
            doctors = directory.len(),
            "loaded doctor directory"
        );
        Ok(directory)
    }

    pub fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn len(&self) -> usize {
        self.doctors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doctors.is_empty()
    }

    /// Recommend doctors in `city` for the specialization of the condition named `disease`.
    ///
    /// # Errors
    ///
    /// - [`TriageError::InvalidInput`] if `disease` or `city` is blank
    /// - [`TriageError::UnknownCondition`] if the catalog has no such condition
    /// - [`TriageError::NoDoctorsFound`] if nobody in `city` practises that specialization
    pub fn recommend(
        &self,
        catalog: &Catalog,
        disease: &str,
        city: &str,
    ) -> TriageResult<Vec<RankedDoctor>> {
        let (disease, city) = (disease.trim(), city.trim());
        if disease.is_empty() || city.is_empty() {
            return Err(TriageError::InvalidInput(
                "disease and city are required parameters".into(),
            ));
        }

        let specialization = &catalog
            .find(disease)
            .ok_or_else(|| TriageError::UnknownCondition(disease.to_string()))?
            .specialization;

        let mut ranked: Vec<RankedDoctor> = self
            .doctors
            .iter()
            .filter(|d| d.city.matches_ignore_case(city))
            .filter(|d| d.specialization.matches_ignore_case(specialization.as_str()))
            .map(|d| RankedDoctor {
                doctor: d.clone(),
                score: d.score(),
            })
            .collect();

        if ranked.is_empty() {
            return Err(TriageError::NoDoctorsFound {
                city: city.to_string(),
                specialization: specialization.to_string(),
            });
        }

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        tracing::debug!(
            disease,
            city,
            %specialization,
            candidates = ranked.len(),
            "recommended doctors"
        );
        Ok(ranked)
    }

    /// All doctors, or those in `city`, optionally truncated to `limit` entries.
    ///
    /// A blank `city` is treated as no filter.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::NoDoctorsInCity`] when a city filter matches nobody.
    pub fn list(&self, city: Option<&str>, limit: Option<usize>) -> TriageResult<Vec<&Doctor>> {
        let city = city.map(str::trim).filter(|c| !c.is_empty());
        let mut doctors: Vec<&Doctor> = match city {
            Some(city) => {
                let filtered: Vec<&Doctor> = self
                    .doctors
                    .iter()
                    .filter(|d| d.city.matches_ignore_case(city))
                    .collect();
                if filtered.is_empty() {
                    return Err(TriageError::NoDoctorsInCity(city.to_string()));
                }
                filtered
            }
            None => self.doctors.iter().collect(),
        };

        if let Some(limit) = limit {
            doctors.truncate(limit);
        }
        Ok(doctors)
    }

    /// Distinct specializations in first-seen order.
    pub fn specializations(&self) -> Vec<&str> {
        distinct(self.doctors.iter().map(|d| d.specialization.as_str()))
    }

    /// Distinct cities in first-seen order.
    pub fn cities(&self) -> Vec<&str> {
        distinct(self.doctors.iter().map(|d| d.city.as_str()))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::new();
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DirectoryWire {
    doctors: Vec<DoctorWire>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DoctorWire {
    name: String,
    specialization: String,
    city: String,
    rating: f64,
    experience: f64,
    #[serde(default)]
    hospital: Option<String>,
}

fn wire_to_domain(wire: DirectoryWire) -> TriageResult<DoctorDirectory> {
    let doctors = wire
        .doctors
        .into_iter()
        .map(|d| {
            Doctor::new(
                d.name,
                d.specialization,
                d.city,
                d.rating,
                d.experience,
                d.hospital,
            )
        })
        .collect::<TriageResult<Vec<_>>>()?;
    Ok(DoctorDirectory::new(doctors))
}
