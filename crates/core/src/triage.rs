//! Triage assessments: ranking, fallback and presentation policy on top of the matcher.

use crate::catalog::Catalog;
use crate::config::CoreConfig;
use crate::demographics::PatientProfile;
use crate::doctors::{Doctor, DoctorDirectory, RankedDoctor};
use crate::fallback;
use crate::matcher::{ConditionMatcher, MatchResult};
use crate::TriageResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// A ranked condition in owned, presentation-ready form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssessedCondition {
    pub name: String,
    pub specialization: String,
    pub description: String,
    pub self_care: Vec<String>,
    /// Raw probability; may exceed 1.0.
    pub probability: f64,
    /// Probability clamped to 0..=100 for display.
    pub display_percentage: u8,
    pub matching_symptoms: Vec<String>,
    pub exact_matches: Vec<String>,
    pub partial_matches: Vec<String>,
    pub word_matches: Vec<String>,
}

impl From<&MatchResult<'_>> for AssessedCondition {
    fn from(result: &MatchResult<'_>) -> Self {
        fn owned(symptoms: &[&str]) -> Vec<String> {
            symptoms.iter().map(|s| s.to_string()).collect()
        }

        let condition = result.condition;
        Self {
            name: condition.name.to_string(),
            specialization: condition.specialization.to_string(),
            description: condition.description.clone(),
            self_care: condition.self_care.clone(),
            probability: result.probability,
            display_percentage: result.display_percentage(),
            matching_symptoms: owned(&result.matching_symptoms),
            exact_matches: owned(&result.exact_matches),
            partial_matches: owned(&result.partial_matches),
            word_matches: owned(&result.word_matches),
        }
    }
}

/// Input to an assessment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageRequest {
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub profile: PatientProfile,
}

impl TriageRequest {
    pub fn new(symptoms: Vec<String>, profile: PatientProfile) -> Self {
        Self { symptoms, profile }
    }
}

/// Outcome of one assessment; the record a caller may persist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriageReport {
    pub id: Uuid,
    pub assessed_at: DateTime<Utc>,
    /// Symptoms as supplied, trimmed, blanks removed.
    pub symptoms: Vec<String>,
    pub profile: PatientProfile,
    /// Highest ranked conditions, never empty.
    pub conditions: Vec<AssessedCondition>,
    /// True when no catalog condition matched and the fallback was substituted.
    pub fallback: bool,
}

impl TriageReport {
    /// The most likely condition.
    pub fn top(&self) -> Option<&AssessedCondition> {
        self.conditions.first()
    }
}

/// Symptom triage over a fixed catalog and doctor directory.
///
/// Cheap to clone; the catalog and directory are shared read-only.
#[derive(Clone, Debug)]
pub struct TriageService {
    cfg: Arc<CoreConfig>,
    catalog: Arc<Catalog>,
    doctors: Arc<DoctorDirectory>,
    matcher: ConditionMatcher,
}

impl TriageService {
    /// Load the catalog and doctor directory named by `cfg`.
    pub fn new(cfg: Arc<CoreConfig>) -> TriageResult<Self> {
        let catalog = cfg.load_catalog()?;
        let doctors = cfg.load_doctors()?;
        Ok(Self::with_data(cfg, catalog, doctors))
    }

    /// Build a service around already-loaded data.
    pub fn with_data(cfg: Arc<CoreConfig>, catalog: Catalog, doctors: DoctorDirectory) -> Self {
        Self {
            cfg,
            catalog: Arc::new(catalog),
            doctors: Arc::new(doctors),
            matcher: ConditionMatcher::default(),
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn doctors(&self) -> &DoctorDirectory {
        &self.doctors
    }

    /// Full ranking without fallback or truncation.
    ///
    /// Symptoms are only lower-cased; whitespace and blank entries take part in scoring.
    pub fn rank<S: AsRef<str>>(
        &self,
        symptoms: &[S],
        profile: Option<&PatientProfile>,
    ) -> Vec<MatchResult<'_>> {
        self.matcher.rank_catalog(symptoms, &self.catalog, profile)
    }

    /// Assess `request`, keeping the configured number of top conditions.
    ///
    /// Never fails: when nothing matches, the report carries the fallback condition.
    pub fn assess(&self, request: &TriageRequest) -> TriageReport {
        let symptoms: Vec<String> = request
            .symptoms
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let ranked = self.rank(&symptoms, Some(&request.profile));
        let fallback = ranked.is_empty();
        let mut conditions = fallback::apply(&ranked);
        conditions.truncate(self.cfg.max_results());

        let report = TriageReport {
            id: Uuid::new_v4(),
            assessed_at: Utc::now(),
            symptoms,
            profile: request.profile,
            conditions,
            fallback,
        };

        if fallback {
            tracing::warn!(
                report_id = %report.id,
                symptoms = report.symptoms.len(),
                "no condition matched; reporting fallback"
            );
        } else {
            tracing::info!(
                report_id = %report.id,
                symptoms = report.symptoms.len(),
                candidates = ranked.len(),
                top = report.top().map(|c| c.name.as_str()).unwrap_or_default(),
                "triage assessment complete"
            );
        }

        report
    }

    /// See [`DoctorDirectory::recommend`].
    pub fn recommend_doctors(&self, disease: &str, city: &str) -> TriageResult<Vec<RankedDoctor>> {
        self.doctors.recommend(&self.catalog, disease, city)
    }

    /// See [`DoctorDirectory::list`].
    pub fn list_doctors(
        &self,
        city: Option<&str>,
        limit: Option<usize>,
    ) -> TriageResult<Vec<&Doctor>> {
        self.doctors.list(city, limit)
    }

    pub fn specializations(&self) -> Vec<&str> {
        self.doctors.specializations()
    }

    pub fn cities(&self) -> Vec<&str> {
        self.doctors.cities()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demographics::Sex;
    use crate::doctors::Doctor;

    fn service(max_results: usize) -> TriageService {
        let cfg = Arc::new(CoreConfig::new(None, None, max_results).expect("config"));
        let doctors = DoctorDirectory::new(vec![Doctor::new(
            "Dr. Rao",
            "Pulmonology",
            "Pune",
            4.5,
            9.0,
            None,
        )
        .expect("doctor")]);
        TriageService::with_data(cfg, Catalog::builtin().expect("builtin"), doctors)
    }

    fn request(symptoms: &[&str]) -> TriageRequest {
        TriageRequest::new(
            symptoms.iter().map(|s| s.to_string()).collect(),
            PatientProfile::new(Some(34), Some(Sex::Female)).expect("profile"),
        )
    }

    #[test]
    fn assess_keeps_top_three() {
        let report = service(3).assess(&request(&["Fever", "Cough", "Fatigue"]));

        assert!(!report.fallback);
        assert_eq!(report.conditions.len(), 3);
        assert!(report
            .conditions
            .windows(2)
            .all(|pair| pair[0].probability >= pair[1].probability));
        // Pneumonia lists all three among six symptoms; 0.6 * 3/6 + 0.4 + 0.2
        let top = report.top().expect("top condition");
        assert_eq!(top.name, "Pneumonia");
        assert!((top.probability - 0.9).abs() < 1e-9);
        assert_eq!(top.display_percentage, 90);
    }

    #[test]
    fn assess_falls_back_on_empty_input() {
        let report = service(3).assess(&request(&["  ", ""]));

        assert!(report.fallback);
        assert!(report.symptoms.is_empty());
        assert_eq!(report.conditions.len(), 1);
        assert_eq!(report.conditions[0].name, "Unspecified Condition");
        assert_eq!(report.conditions[0].probability, 0.5);
    }

    #[test]
    fn assess_cleans_padded_and_blank_symptoms() {
        let svc = service(3);
        let padded = svc.assess(&request(&[" Wheezing  ", "", "\t"]));
        let clean = svc.assess(&request(&["wheezing"]));

        assert_eq!(padded.symptoms, vec!["Wheezing".to_string()]);
        let top = padded.top().expect("top condition");
        assert!(!top.exact_matches.is_empty());
        assert_eq!(top.name, clean.top().expect("top condition").name);
        assert!((top.probability - clean.conditions[0].probability).abs() < 1e-9);
    }

    #[test]
    fn assess_falls_back_when_nothing_matches() {
        let report = service(3).assess(&request(&["xyzzy"]));
        assert!(report.fallback);
        assert_eq!(report.symptoms, vec!["xyzzy".to_string()]);
    }

    #[test]
    fn rank_returns_everything_untruncated() {
        let svc = service(1);
        let ranked = svc.rank(&["fatigue"], None);
        assert!(ranked.len() > 1);
        assert_eq!(svc.assess(&request(&["fatigue"])).conditions.len(), 1);
    }

    #[test]
    fn report_serializes_for_persistence() {
        let report = service(2).assess(&request(&["wheezing"]));
        let json = serde_json::to_string(&report).expect("serialize");
        let back: TriageReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.id, report.id);
        assert_eq!(back.assessed_at, report.assessed_at);
        assert_eq!(back.conditions.len(), report.conditions.len());
        assert_eq!(back.conditions[0].name, report.conditions[0].name);
        assert!(json.contains("\"sex\":\"female\""));
    }

    #[test]
    fn service_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TriageService>();
        assert_send_sync::<Catalog>();
    }

    #[test]
    fn delegates_doctor_queries() {
        let svc = service(3);
        let ranked = svc.recommend_doctors("Pneumonia", "pune").expect("found");
        assert_eq!(ranked[0].doctor.name.as_str(), "Dr. Rao");
        assert_eq!(svc.specializations(), vec!["Pulmonology"]);
        assert_eq!(svc.cities(), vec!["Pune"]);
        assert_eq!(svc.list_doctors(None, Some(0)).expect("list").len(), 0);
    }
}
