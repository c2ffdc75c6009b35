//! Condition catalog: the immutable set of conditions symptoms are matched against.
//!
//! Responsibilities:
//! - Define the domain-level [`ConditionRecord`] and the validated [`Catalog`] container
//! - Define a strict wire model for YAML/JSON catalog files
//! - Validate catalog invariants once, at construction time
//!
//! Invariants enforced here (the matcher relies on them but stays total without them):
//! - every condition has at least one canonical symptom
//! - canonical symptoms are unique within a condition, ignoring case
//! - condition names are unique within a catalog, ignoring case

use crate::constants::{BUILTIN_CATALOG_YAML, DEFAULT_DEMOGRAPHIC_FACTOR};
use crate::demographics::{DemographicAdjustment, Sex};
use crate::document::{self, DocumentFormat};
use crate::{TriageError, TriageResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use triage_types::NonEmptyText;

// ============================================================================
// Public domain-level types
// ============================================================================

/// A known medical condition and its canonical symptom vocabulary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConditionRecord {
    /// Display name, unique within a catalog.
    pub name: NonEmptyText,

    /// Medical specialty used to route the patient to a doctor search.
    pub specialization: NonEmptyText,

    /// Canonical symptoms. Order is irrelevant for matching but is preserved for display.
    pub symptoms: Vec<NonEmptyText>,

    /// Free-text description.
    pub description: String,

    /// Self-care recommendations, possibly empty.
    pub self_care: Vec<String>,
}

impl ConditionRecord {
    /// Create a validated condition record.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError`] if the name or specialization is blank, any symptom is blank,
    /// the symptom list is empty, or two symptoms differ only by case.
    pub fn new(
        name: impl AsRef<str>,
        specialization: impl AsRef<str>,
        symptoms: impl IntoIterator<Item = impl AsRef<str>>,
        description: impl Into<String>,
        self_care: impl IntoIterator<Item = impl Into<String>>,
    ) -> TriageResult<Self> {
        let name = NonEmptyText::new(name)
            .map_err(|_| TriageError::InvalidCatalog("condition name cannot be empty".into()))?;
        let specialization = NonEmptyText::new(specialization).map_err(|_| {
            TriageError::InvalidCatalog(format!("condition '{name}' has an empty specialization"))
        })?;

        let mut seen = HashSet::new();
        let mut canonical = Vec::new();
        for symptom in symptoms {
            let symptom = NonEmptyText::new(symptom).map_err(|_| {
                TriageError::InvalidCatalog(format!("condition '{name}' has an empty symptom"))
            })?;
            if !seen.insert(symptom.folded()) {
                return Err(TriageError::InvalidCatalog(format!(
                    "condition '{name}' lists symptom '{symptom}' more than once"
                )));
            }
            canonical.push(symptom);
        }
        if canonical.is_empty() {
            return Err(TriageError::InvalidCatalog(format!(
                "condition '{name}' has no symptoms"
            )));
        }

        Ok(Self {
            name,
            specialization,
            symptoms: canonical,
            description: description.into(),
            self_care: self_care.into_iter().map(Into::into).collect(),
        })
    }
}

/// Validated, immutable condition catalog.
///
/// Built once at startup and shared read-only; matching never mutates it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    conditions: Vec<ConditionRecord>,
    adjustments: Vec<DemographicAdjustment>,
}

impl Catalog {
    /// Create a catalog from already-validated records.
    ///
    /// An empty list is accepted; matching against it yields no results.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::InvalidCatalog`] if two conditions share a name (ignoring case).
    pub fn new(conditions: Vec<ConditionRecord>) -> TriageResult<Self> {
        let mut seen = HashSet::new();
        for condition in &conditions {
            if !seen.insert(condition.name.folded()) {
                return Err(TriageError::InvalidCatalog(format!(
                    "duplicate condition name '{}'",
                    condition.name
                )));
            }
        }
        Ok(Self {
            conditions,
            adjustments: Vec::new(),
        })
    }

    /// Attach demographic adjustments.
    ///
    /// Adjustments naming a condition that is not in the catalog are kept (they simply never
    /// apply) and logged.
    pub fn with_adjustments(mut self, adjustments: Vec<DemographicAdjustment>) -> Self {
        for adjustment in &adjustments {
            if self.find(adjustment.condition()).is_none() {
                tracing::warn!(
                    condition = adjustment.condition(),
                    "demographic adjustment names a condition absent from the catalog"
                );
            }
        }
        self.adjustments = adjustments;
        self
    }

    /// The condition catalog shipped with the application.
    pub fn builtin() -> TriageResult<Self> {
        Self::parse(BUILTIN_CATALOG_YAML)
    }

    /// Parse a catalog from YAML text. JSON documents are valid YAML and are accepted too.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::Schema`] if the document does not match the wire schema
    /// (unknown keys, wrong types), or [`TriageError::InvalidCatalog`] if it violates a catalog
    /// invariant or contains no conditions.
    pub fn parse(text: &str) -> TriageResult<Self> {
        let wire: CatalogWire = document::decode(text, DocumentFormat::Yaml, "catalog")?;
        wire_to_domain(wire)
    }

    /// Load a catalog file; `.json` files are parsed as JSON, anything else as YAML.
    pub fn load(path: &Path) -> TriageResult<Self> {
        let text = document::read(path)?;
        let wire: CatalogWire =
            document::decode(&text, DocumentFormat::from_path(path), "catalog")?;
        let catalog = wire_to_domain(wire)?;
        tracing::info!(
            path = %path.display(),
            conditions = catalog.len(),
            "loaded condition catalog"
        );
        Ok(catalog)
    }

    pub fn conditions(&self) -> &[ConditionRecord] {
        &self.conditions
    }

    pub fn adjustments(&self) -> &[DemographicAdjustment] {
        &self.adjustments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConditionRecord> {
        self.conditions.iter()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Case-insensitive lookup by condition name.
    pub fn find(&self, name: &str) -> Option<&ConditionRecord> {
        self.conditions
            .iter()
            .find(|condition| condition.name.matches_ignore_case(name))
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a ConditionRecord;
    type IntoIter = std::slice::Iter<'a, ConditionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogWire {
    conditions: Vec<ConditionWire>,
    #[serde(default)]
    adjustments: Vec<AdjustmentWire>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConditionWire {
    name: String,
    specialization: String,
    symptoms: Vec<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    self_care: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AdjustmentWire {
    condition: String,
    sex: Sex,
    #[serde(default = "default_factor")]
    factor: f64,
}

fn default_factor() -> f64 {
    DEFAULT_DEMOGRAPHIC_FACTOR
}

fn wire_to_domain(wire: CatalogWire) -> TriageResult<Catalog> {
    if wire.conditions.is_empty() {
        return Err(TriageError::InvalidCatalog(
            "catalog contains no conditions".into(),
        ));
    }

    let conditions = wire
        .conditions
        .into_iter()
        .map(|c| {
            ConditionRecord::new(
                c.name,
                c.specialization,
                c.symptoms,
                c.description,
                c.self_care,
            )
        })
        .collect::<TriageResult<Vec<_>>>()?;

    let adjustments = wire
        .adjustments
        .into_iter()
        .map(|a| DemographicAdjustment::new(a.condition, a.sex, a.factor))
        .collect::<TriageResult<Vec<_>>>()?;

    Ok(Catalog::new(conditions)?.with_adjustments(adjustments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"conditions:
  - name: Influenza
    specialization: General Medicine
    symptoms: [Fever, Cough, Fatigue]
    description: A contagious viral infection.
    self_care:
      - Rest and stay hydrated
  - name: Asthma
    specialization: Pulmonology
    symptoms: [Wheezing, Chest tightness]
"#;

    #[test]
    fn builtin_catalog_loads_all_conditions() {
        let catalog = Catalog::builtin().expect("builtin catalog is valid");
        assert_eq!(catalog.len(), 15);
        assert!(catalog.adjustments().is_empty());

        let asthma = catalog.find("asthma").expect("asthma present");
        assert_eq!(asthma.specialization.as_str(), "Pulmonology");
        assert_eq!(asthma.symptoms.len(), 5);
        assert!(catalog.iter().all(|c| !c.symptoms.is_empty()));
    }

    #[test]
    fn parses_sample_with_defaults() {
        let catalog = Catalog::parse(SAMPLE).expect("parse sample");
        assert_eq!(catalog.len(), 2);

        let asthma = catalog.find(" ASTHMA ").expect("case-insensitive lookup");
        assert!(asthma.description.is_empty());
        assert!(asthma.self_care.is_empty());

        let names: Vec<&str> = catalog.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Influenza", "Asthma"]);
    }

    #[test]
    fn strict_validation_rejects_unknown_keys() {
        let input = format!("{SAMPLE}unexpected_key: true\n");
        let err = Catalog::parse(&input).expect_err("should reject unknown key");
        match err {
            TriageError::Schema(msg) => assert!(msg.contains("unexpected_key"), "{msg}"),
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_condition_without_symptoms() {
        let input = r#"conditions:
  - name: Mystery
    specialization: General Medicine
    symptoms: []
"#;
        let err = Catalog::parse(input).expect_err("should reject empty symptoms");
        assert!(matches!(err, TriageError::InvalidCatalog(msg) if msg.contains("no symptoms")));
    }

    #[test]
    fn rejects_duplicate_condition_names() {
        let input = r#"conditions:
  - name: Asthma
    specialization: Pulmonology
    symptoms: [Wheezing]
  - name: asthma
    specialization: Pulmonology
    symptoms: [Cough]
"#;
        let err = Catalog::parse(input).expect_err("should reject duplicate names");
        assert!(matches!(err, TriageError::InvalidCatalog(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn rejects_duplicate_symptoms_ignoring_case() {
        let err = ConditionRecord::new(
            "Influenza",
            "General Medicine",
            ["Fever", "fever"],
            "",
            Vec::<String>::new(),
        )
        .expect_err("duplicate symptom");
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn rejects_empty_catalog_document() {
        let err = Catalog::parse("conditions: []\n").expect_err("empty catalog");
        assert!(matches!(err, TriageError::InvalidCatalog(msg) if msg.contains("no conditions")));
    }

    #[test]
    fn parses_adjustments_with_default_factor() {
        let input = format!(
            "{SAMPLE}adjustments:\n  - condition: Influenza\n    sex: female\n  - condition: Asthma\n    sex: male\n    factor: 1.5\n"
        );
        let catalog = Catalog::parse(&input).expect("parse adjustments");
        let adjustments = catalog.adjustments();
        assert_eq!(adjustments.len(), 2);
        assert_eq!(adjustments[0].factor(), DEFAULT_DEMOGRAPHIC_FACTOR);
        assert_eq!(adjustments[0].sex(), Sex::Female);
        assert_eq!(adjustments[1].factor(), 1.5);
    }

    #[test]
    fn loads_json_and_yaml_files() {
        let dir = tempfile::tempdir().expect("tempdir");

        let yaml_path = dir.path().join("catalog.yaml");
        std::fs::write(&yaml_path, SAMPLE).expect("write yaml");
        let from_yaml = Catalog::load(&yaml_path).expect("load yaml");

        let json_path = dir.path().join("catalog.json");
        let mut file = std::fs::File::create(&json_path).expect("create json");
        write!(
            file,
            r#"{{"conditions": [
                {{"name": "Influenza", "specialization": "General Medicine",
                  "symptoms": ["Fever", "Cough", "Fatigue"],
                  "description": "A contagious viral infection.",
                  "self_care": ["Rest and stay hydrated"]}},
                {{"name": "Asthma", "specialization": "Pulmonology",
                  "symptoms": ["Wheezing", "Chest tightness"]}}
            ]}}"#
        )
        .expect("write json");
        let from_json = Catalog::load(&json_path).expect("load json");

        assert_eq!(from_yaml, from_json);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Catalog::load(Path::new("/no/such/catalog.yaml")).expect_err("missing");
        assert!(matches!(err, TriageError::FileRead { .. }));
    }
}
