//! # API REST
//!
//! REST API implementation for the triage service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Uses `api-shared` for request/response bodies and `triage-core` for all domain logic.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    AssessedConditionRes, CitiesRes, ConditionSummary, DoctorRes, ErrorRes, HealthRes,
    HealthService, ListConditionsRes, ListDoctorsRes, RecommendDoctorsReq, RecommendDoctorsRes,
    SpecializationsRes, TriageReq, TriageRes,
};
use triage_core::config::{max_results_from_env_value, path_from_env_value};
use triage_core::{
    AssessedCondition, ConditionRecord, CoreConfig, Doctor, PatientProfile, RankedDoctor, Sex,
    TriageError, TriageReport, TriageRequest, TriageResult, TriageService,
};

/// Default listen address when `TRIAGE_REST_ADDR` is unset.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Application state for the REST API server
///
/// Shared by every request handler; the service holds the catalog and doctor directory.
#[derive(Clone)]
pub struct AppState {
    service: Arc<TriageService>,
}

impl AppState {
    pub fn new(service: TriageService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_conditions,
        triage,
        recommend_doctors,
        list_doctors,
        list_specializations,
        list_cities,
    ),
    components(schemas(
        HealthRes,
        ErrorRes,
        ConditionSummary,
        ListConditionsRes,
        TriageReq,
        TriageRes,
        AssessedConditionRes,
        RecommendDoctorsReq,
        RecommendDoctorsRes,
        DoctorRes,
        ListDoctorsRes,
        SpecializationsRes,
        CitiesRes,
    ))
)]
pub struct ApiDoc;

/// Resolve [`CoreConfig`] from `TRIAGE_*` environment variables.
///
/// # Environment Variables
/// - `TRIAGE_CATALOG_FILE`: condition catalog (default: built-in catalog)
/// - `TRIAGE_DOCTORS_FILE`: doctor directory (default: empty directory)
/// - `TRIAGE_MAX_RESULTS`: conditions kept per assessment (default: 3)
///
/// # Errors
/// Returns an error if `TRIAGE_MAX_RESULTS` is not a positive integer or a configured file does
/// not exist.
pub fn config_from_env() -> anyhow::Result<CoreConfig> {
    let catalog_file = path_from_env_value(std::env::var("TRIAGE_CATALOG_FILE").ok());
    let doctors_file = path_from_env_value(std::env::var("TRIAGE_DOCTORS_FILE").ok());
    let max_results = max_results_from_env_value(std::env::var("TRIAGE_MAX_RESULTS").ok())?;

    Ok(CoreConfig::new(catalog_file, doctors_file, max_results)?)
}

/// Build the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/conditions", get(list_conditions))
        .route("/triage", post(triage))
        .route("/doctors", get(list_doctors))
        .route("/doctors/recommend", post(recommend_doctors))
        .route("/specializations", get(list_specializations))
        .route("/cities", get(list_cities))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

type ApiError = (StatusCode, Json<ErrorRes>);

/// Map a core error onto a status code and JSON error body.
///
/// Server-side failures are logged in full and reported to the caller as "Internal error".
fn api_error(context: &str, err: TriageError) -> ApiError {
    let (status, message) = if err.is_client_error() {
        (StatusCode::BAD_REQUEST, err.to_string())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, err.to_string())
    } else {
        tracing::error!("{context} error: {:?}", err);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorRes {
                error: "Internal error".into(),
            }),
        );
    };
    rejected(context, status, message)
}

/// Log a refused request and wrap its message in a JSON error body.
fn rejected(context: &str, status: StatusCode, message: String) -> ApiError {
    tracing::warn!(status = status.as_u16(), "{context} rejected: {message}");
    (status, Json(ErrorRes { error: message }))
}

/// Turn an extractor rejection (malformed body, wrong field type) into a JSON error body.
fn json_rejection(context: &str, rejection: JsonRejection) -> ApiError {
    rejected(context, rejection.status(), rejection.body_text())
}

fn query_rejection(context: &str, rejection: QueryRejection) -> ApiError {
    rejected(context, rejection.status(), rejection.body_text())
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DoctorsQuery {
    /// Only list doctors in this city (case-insensitive).
    city: Option<String>,
    /// Maximum number of doctors; zero and non-numeric values mean no limit.
    limit: Option<String>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/conditions",
    responses(
        (status = 200, description = "Conditions in the catalog", body = ListConditionsRes)
    )
)]
/// List every condition in the loaded catalog, in catalog order.
#[axum::debug_handler]
async fn list_conditions(State(state): State<AppState>) -> Json<ListConditionsRes> {
    let conditions = state
        .service
        .catalog()
        .iter()
        .map(condition_summary)
        .collect();
    Json(ListConditionsRes { conditions })
}

#[utoipa::path(
    post,
    path = "/triage",
    request_body = TriageReq,
    responses(
        (status = 200, description = "Ranked likely conditions", body = TriageRes),
        (status = 400, description = "Invalid age or sex, or malformed JSON", body = ErrorRes),
        (status = 422, description = "Body does not match the request schema", body = ErrorRes)
    )
)]
/// Assess a list of symptoms
///
/// Returns the most likely conditions, best first. When nothing matches the response carries a
/// single generic condition and `fallback` is true; an empty symptom list is not an error.
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - `sex` is not `male` or `female`, or
/// - `age` is out of range.
#[axum::debug_handler]
async fn triage(
    State(state): State<AppState>,
    payload: Result<Json<TriageReq>, JsonRejection>,
) -> Result<Json<TriageRes>, ApiError> {
    let Json(req) = payload.map_err(|r| json_rejection("Triage", r))?;
    let profile =
        profile_from_req(req.age, req.sex.as_deref()).map_err(|e| api_error("Triage", e))?;
    let report = state
        .service
        .assess(&TriageRequest::new(req.symptoms, profile));
    Ok(Json(triage_res(report)))
}

#[utoipa::path(
    post,
    path = "/doctors/recommend",
    request_body = RecommendDoctorsReq,
    responses(
        (status = 200, description = "Doctors ranked by rating and experience", body = RecommendDoctorsRes),
        (status = 400, description = "Missing disease or city", body = ErrorRes),
        (status = 404, description = "Unknown disease or no matching doctor", body = ErrorRes),
        (status = 422, description = "Body does not match the request schema", body = ErrorRes)
    )
)]
/// Recommend doctors in a city for the specialization treating a condition
///
/// # Errors
/// Returns `400 Bad Request` if `disease` or `city` is missing, and `404 Not Found` if the
/// condition is unknown or no doctor in the city practises its specialization.
#[axum::debug_handler]
async fn recommend_doctors(
    State(state): State<AppState>,
    payload: Result<Json<RecommendDoctorsReq>, JsonRejection>,
) -> Result<Json<RecommendDoctorsRes>, ApiError> {
    let Json(req) = payload.map_err(|r| json_rejection("Recommend doctors", r))?;
    let ranked = state
        .service
        .recommend_doctors(&req.disease, &req.city)
        .map_err(|e| api_error("Recommend doctors", e))?;

    let specialization = ranked
        .first()
        .map(|r| r.doctor.specialization.to_string())
        .unwrap_or_default();

    Ok(Json(RecommendDoctorsRes {
        disease: req.disease.trim().to_string(),
        city: req.city.trim().to_string(),
        specialization,
        doctors: ranked.iter().map(ranked_doctor_res).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/doctors",
    params(DoctorsQuery),
    responses(
        (status = 200, description = "Doctors in the directory", body = ListDoctorsRes),
        (status = 400, description = "Malformed query string", body = ErrorRes),
        (status = 404, description = "No doctors in the requested city", body = ErrorRes)
    )
)]
/// List doctors, optionally filtered by city and limited in number.
#[axum::debug_handler]
async fn list_doctors(
    State(state): State<AppState>,
    query: Result<Query<DoctorsQuery>, QueryRejection>,
) -> Result<Json<ListDoctorsRes>, ApiError> {
    let Query(query) = query.map_err(|r| query_rejection("List doctors", r))?;
    let limit = query
        .limit
        .as_deref()
        .and_then(|l| l.trim().parse::<usize>().ok())
        .filter(|&l| l > 0);

    let doctors = state
        .service
        .list_doctors(query.city.as_deref(), limit)
        .map_err(|e| api_error("List doctors", e))?;

    Ok(Json(ListDoctorsRes {
        count: doctors.len(),
        doctors: doctors.into_iter().map(|d| doctor_res(d, None)).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/specializations",
    responses(
        (status = 200, description = "Distinct specializations in the directory", body = SpecializationsRes)
    )
)]
#[axum::debug_handler]
async fn list_specializations(State(state): State<AppState>) -> Json<SpecializationsRes> {
    Json(SpecializationsRes {
        specializations: to_owned(state.service.specializations()),
    })
}

#[utoipa::path(
    get,
    path = "/cities",
    responses(
        (status = 200, description = "Distinct cities in the directory", body = CitiesRes)
    )
)]
#[axum::debug_handler]
async fn list_cities(State(state): State<AppState>) -> Json<CitiesRes> {
    Json(CitiesRes {
        cities: to_owned(state.service.cities()),
    })
}

// Helpers

fn profile_from_req(age: Option<u8>, sex: Option<&str>) -> TriageResult<PatientProfile> {
    let sex = sex
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<Sex>)
        .transpose()?;
    PatientProfile::new(age, sex)
}

fn condition_summary(condition: &ConditionRecord) -> ConditionSummary {
    ConditionSummary {
        name: condition.name.to_string(),
        specialization: condition.specialization.to_string(),
        symptoms: condition.symptoms.iter().map(|s| s.to_string()).collect(),
        description: condition.description.clone(),
        self_care: condition.self_care.clone(),
    }
}

fn triage_res(report: TriageReport) -> TriageRes {
    TriageRes {
        id: report.id.to_string(),
        assessed_at: report.assessed_at.to_rfc3339(),
        symptoms: report.symptoms,
        conditions: report
            .conditions
            .into_iter()
            .map(assessed_condition_res)
            .collect(),
        fallback: report.fallback,
    }
}

fn assessed_condition_res(condition: AssessedCondition) -> AssessedConditionRes {
    AssessedConditionRes {
        name: condition.name,
        specialization: condition.specialization,
        description: condition.description,
        self_care: condition.self_care,
        probability: condition.probability,
        percentage: condition.display_percentage,
        matching_symptoms: condition.matching_symptoms,
        exact_matches: condition.exact_matches,
        partial_matches: condition.partial_matches,
        word_matches: condition.word_matches,
    }
}

fn doctor_res(doctor: &Doctor, score: Option<f64>) -> DoctorRes {
    DoctorRes {
        name: doctor.name.to_string(),
        specialization: doctor.specialization.to_string(),
        city: doctor.city.to_string(),
        rating: doctor.rating,
        experience: doctor.experience,
        hospital: doctor.hospital.clone(),
        score,
    }
}

fn ranked_doctor_res(ranked: &RankedDoctor) -> DoctorRes {
    doctor_res(&ranked.doctor, Some(ranked.score))
}

fn to_owned(values: Vec<&str>) -> Vec<String> {
    values.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, Bytes};
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;
    use triage_core::{Catalog, DoctorDirectory};

    fn app() -> Router {
        let doctors = DoctorDirectory::new(vec![
            Doctor::new("Dr. Mehta", "Pulmonology", "Pune", 4.9, 3.0, None).expect("doctor"),
            Doctor::new(
                "Dr. Rao",
                "Pulmonology",
                "Pune",
                4.5,
                9.0,
                Some("Ruby Hall".into()),
            )
            .expect("doctor"),
            Doctor::new("Dr. Iyer", "Cardiology", "Mumbai", 4.2, 15.0, None).expect("doctor"),
        ]);
        let service = TriageService::with_data(
            Arc::new(CoreConfig::default()),
            Catalog::builtin().expect("builtin catalog"),
            doctors,
        );
        router(AppState::new(service))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Bytes) {
        let response = app().oneshot(request).await.expect("response");
        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        (status, body)
    }

    fn decode<T: DeserializeOwned>(body: &[u8]) -> T {
        serde_json::from_slice(body).expect("json body")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    fn post_json(uri: &str, json: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn health_is_alive() {
        let (status, body) = send(get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        let res: HealthRes = decode(&body);
        assert!(res.ok);
    }

    #[tokio::test]
    async fn lists_builtin_conditions() {
        let (status, body) = send(get("/conditions")).await;
        assert_eq!(status, StatusCode::OK);
        let res: ListConditionsRes = decode(&body);
        assert_eq!(res.conditions.len(), 15);
        assert_eq!(res.conditions[0].name, "Hypertensive disease");
    }

    #[tokio::test]
    async fn triage_ranks_conditions() {
        let (status, body) = send(post_json(
            "/triage",
            r#"{"symptoms":["Fever","Cough","Fatigue"],"age":40,"sex":"male"}"#,
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        let res: TriageRes = decode(&body);
        assert!(!res.fallback);
        assert_eq!(res.conditions.len(), 3);
        assert_eq!(res.conditions[0].name, "Pneumonia");
        assert_eq!(res.conditions[0].percentage, 90);
    }

    #[tokio::test]
    async fn triage_without_symptoms_reports_fallback() {
        let (status, body) = send(post_json("/triage", r#"{"symptoms":[]}"#)).await;

        assert_eq!(status, StatusCode::OK);
        let res: TriageRes = decode(&body);
        assert!(res.fallback);
        assert_eq!(res.conditions.len(), 1);
        assert_eq!(res.conditions[0].name, "Unspecified Condition");
        assert_eq!(res.conditions[0].percentage, 50);
    }

    #[tokio::test]
    async fn triage_rejects_unknown_sex() {
        let (status, body) = send(post_json(
            "/triage",
            r#"{"symptoms":["Fever"],"sex":"unknown"}"#,
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let res: ErrorRes = decode(&body);
        assert!(res.error.contains("unknown"));
    }

    #[tokio::test]
    async fn malformed_bodies_get_json_errors() {
        let (status, body) = send(post_json(
            "/triage",
            r#"{"symptoms":["Fever"],"age":300}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let res: ErrorRes = decode(&body);
        assert!(res.error.contains("age"), "{}", res.error);

        let (status, body) = send(post_json("/triage", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let res: ErrorRes = decode(&body);
        assert!(!res.error.is_empty());

        let (status, body) = send(post_json("/doctors/recommend", r#"{"disease":7}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let res: ErrorRes = decode(&body);
        assert!(res.error.contains("disease"), "{}", res.error);
    }

    #[tokio::test]
    async fn malformed_query_gets_json_error() {
        let (status, body) = send(get("/doctors?city=Pune&city=Mumbai")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let res: ErrorRes = decode(&body);
        assert!(res.error.contains("city"), "{}", res.error);
    }

    #[tokio::test]
    async fn recommends_doctors_by_score() {
        let (status, body) = send(post_json(
            "/doctors/recommend",
            r#"{"disease":"Asthma","city":"pune"}"#,
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        let res: RecommendDoctorsRes = decode(&body);
        assert_eq!(res.specialization, "Pulmonology");
        let names: Vec<&str> = res.doctors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Dr. Rao", "Dr. Mehta"]);
        assert_eq!(res.doctors[0].hospital.as_deref(), Some("Ruby Hall"));
        assert!(res.doctors[0].score.is_some());
    }

    #[tokio::test]
    async fn recommend_maps_errors_to_status_codes() {
        let (status, _) = send(post_json("/doctors/recommend", r#"{"disease":"Asthma"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(post_json(
            "/doctors/recommend",
            r#"{"disease":"Scurvy","city":"Pune"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let res: ErrorRes = decode(&body);
        assert!(res.error.contains("Scurvy"));

        let (status, _) = send(post_json(
            "/doctors/recommend",
            r#"{"disease":"Migraine disorders","city":"Pune"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn lists_doctors_with_filters() {
        let (status, body) = send(get("/doctors?limit=abc")).await;
        assert_eq!(status, StatusCode::OK);
        let res: ListDoctorsRes = decode(&body);
        assert_eq!(res.count, 3);

        let (_, body) = send(get("/doctors?city=PUNE&limit=1")).await;
        let res: ListDoctorsRes = decode(&body);
        assert_eq!(res.count, 1);
        assert_eq!(res.doctors[0].name, "Dr. Mehta");
        assert!(res.doctors[0].score.is_none());

        let (_, body) = send(get("/doctors?limit=0")).await;
        let res: ListDoctorsRes = decode(&body);
        assert_eq!(res.count, 3);

        let (status, _) = send(get("/doctors?city=Delhi")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn lists_specializations_and_cities() {
        let (_, body) = send(get("/specializations")).await;
        let res: SpecializationsRes = decode(&body);
        assert_eq!(res.specializations, vec!["Pulmonology", "Cardiology"]);

        let (_, body) = send(get("/cities")).await;
        let res: CitiesRes = decode(&body);
        assert_eq!(res.cities, vec!["Pune", "Mumbai"]);
    }
}
