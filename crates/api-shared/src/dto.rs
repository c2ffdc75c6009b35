//! Request and response bodies for the triage HTTP API.
//!
//! These types are plain data: they carry no validation. Handlers convert them into core domain
//! types, which is where invalid input is rejected.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Error body returned with every non-2xx response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConditionSummary {
    pub name: String,
    pub specialization: String,
    pub symptoms: Vec<String>,
    pub description: String,
    pub self_care: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListConditionsRes {
    pub conditions: Vec<ConditionSummary>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TriageReq {
    /// Free-text symptoms; matched case-insensitively.
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub age: Option<u8>,
    /// `male` or `female`.
    #[serde(default)]
    pub sex: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AssessedConditionRes {
    pub name: String,
    pub specialization: String,
    pub description: String,
    pub self_care: Vec<String>,
    pub probability: f64,
    /// Probability as a whole percentage, clamped to 0-100.
    pub percentage: u8,
    pub matching_symptoms: Vec<String>,
    pub exact_matches: Vec<String>,
    pub partial_matches: Vec<String>,
    pub word_matches: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TriageRes {
    pub id: String,
    /// RFC 3339 timestamp.
    pub assessed_at: String,
    pub symptoms: Vec<String>,
    pub conditions: Vec<AssessedConditionRes>,
    /// True when no condition matched and the generic fallback is reported.
    pub fallback: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecommendDoctorsReq {
    #[serde(default)]
    pub disease: String,
    #[serde(default)]
    pub city: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DoctorRes {
    pub name: String,
    pub specialization: String,
    pub city: String,
    pub rating: f64,
    pub experience: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital: Option<String>,
    /// Recommendation score; only present on recommendations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecommendDoctorsRes {
    pub disease: String,
    pub city: String,
    pub specialization: String,
    pub doctors: Vec<DoctorRes>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListDoctorsRes {
    pub count: usize,
    pub doctors: Vec<DoctorRes>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SpecializationsRes {
    pub specializations: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CitiesRes {
    pub cities: Vec<String>,
}
