//! # API REST
//!
//! REST API for the kiosk check-in relay.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON bodies, status codes, CORS, request tracing)
//!
//! All queue logic lives in `kiosk-core`; handlers translate between HTTP and
//! [`QueueRelay`] calls.

#![warn(rust_2018_idioms)]

mod error;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::auth::{validate_api_key, API_KEY_HEADER};
use api_shared::{
    CallNextRes, CheckInReq, EnrichedEntry, HealthRes, MessageRes, QueueEntry, VitalSignsReq,
};
use kiosk_core::{CoreConfig, KioskError, PatientId, QueueRelay, Submission};

pub use error::ApiError;

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    relay: Arc<QueueRelay>,
    admin_api_key: Option<Arc<str>>,
}

impl AppState {
    /// Builds handler state; only the admin key is taken from `cfg`.
    pub fn new(relay: Arc<QueueRelay>, cfg: &CoreConfig) -> Self {
        Self {
            relay,
            admin_api_key: cfg.admin_api_key().map(Arc::from),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health_check, list_patients, create_patient, get_patient, call_next),
    components(schemas(
        HealthRes,
        QueueEntry,
        EnrichedEntry,
        CheckInReq,
        VitalSignsReq,
        MessageRes,
        CallNextRes
    ))
)]
pub struct ApiDoc;

/// Builds the kiosk REST router.
///
/// Routes are mounted under `/api`, with Swagger UI at `/swagger-ui` and the OpenAPI
/// document at `/api-docs/openapi.json`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health-check", get(health_check))
        .route("/api/patients", get(list_patients).post(create_patient))
        .route("/api/patient/:id", get(get_patient))
        .route("/api/queue/next", post(call_next))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/health-check",
    responses(
        (status = 200, description = "External API reachable", body = HealthRes),
        (status = 503, description = "External API not responding", body = HealthRes)
    )
)]
/// Health check endpoint
///
/// Probes the external queue-assigner rather than reporting on this process alone, so
/// the kiosk can tell staff when check-in will not work.
#[axum::debug_handler]
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthRes>) {
    let res = state.relay.health().await;
    let status = if res.is_up() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(res))
}

#[utoipa::path(
    get,
    path = "/api/patients",
    responses(
        (status = 200, description = "Queue in external order, with names", body = [EnrichedEntry]),
        (status = 500, description = "Local name store unavailable", body = MessageRes),
        (status = 503, description = "External API unavailable", body = MessageRes)
    )
)]
/// List the queue
///
/// Fetches the live queue from the queue-assigner and attaches each patient's stored
/// name, or `"Anonymous"` when none is stored.
#[axum::debug_handler]
async fn list_patients(
    State(state): State<AppState>,
) -> Result<Json<Vec<EnrichedEntry>>, ApiError> {
    let queue = state.relay.list_queue().await?;
    Ok(Json(queue))
}

#[utoipa::path(
    post,
    path = "/api/patients",
    request_body = CheckInReq,
    responses(
        (status = 201, description = "Patient queued and name stored", body = EnrichedEntry),
        (status = 202, description = "Prediction accepted; queue entry not yet visible"),
        (status = 400, description = "Invalid check-in", body = MessageRes),
        (status = 503, description = "External API unavailable", body = MessageRes)
    )
)]
/// Submit a check-in
///
/// Validates the form, forwards it to the queue-assigner for prediction, and stores the
/// patient's name against the id the queue-assigner assigned.
#[axum::debug_handler]
async fn create_patient(
    State(state): State<AppState>,
    body: Result<Json<CheckInReq>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    match state.relay.submit(&req).await? {
        Submission::Enrolled(entry) => Ok((StatusCode::CREATED, Json(entry)).into_response()),
        Submission::Pending(prediction) => {
            Ok((StatusCode::ACCEPTED, Json(prediction)).into_response())
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/patient/{id}",
    params(("id" = String, Path, description = "Patient id assigned by the queue-assigner")),
    responses(
        (status = 200, description = "Queued patient", body = EnrichedEntry),
        (status = 404, description = "Patient not found in queue", body = MessageRes)
    )
)]
/// Fetch one queued patient
#[axum::debug_handler]
async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EnrichedEntry>, ApiError> {
    let id = PatientId::parse(&id).map_err(|_| KioskError::PatientNotFound(id.clone()))?;
    let patient = state.relay.get_patient(&id).await?;
    Ok(Json(patient))
}

#[utoipa::path(
    post,
    path = "/api/queue/next",
    responses(
        (status = 200, description = "Next patient called", body = CallNextRes),
        (status = 401, description = "Admin API key required", body = MessageRes),
        (status = 404, description = "No patients in queue", body = MessageRes)
    )
)]
/// Call the next patient
///
/// Dequeues the next patient at the queue-assigner and deletes their stored name.
/// Requires the `x-api-key` header when an admin key is configured.
#[axum::debug_handler]
async fn call_next(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CallNextRes>, ApiError> {
    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    validate_api_key(state.admin_api_key.as_deref(), provided)?;

    let called_patient = state.relay.call_next().await?;
    Ok(Json(CallNextRes {
        message: "Next patient called successfully".into(),
        called_patient,
    }))
}
