use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::{CreatePatientRequest, PatientSearchQuery, UpdatePatientRequest};
use crate::services::registry::PatientRegistryService;

#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Admin)?;

    if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
        return Err(AppError::ValidationError("Patient name must not be empty".to_string()));
    }

    let service = PatientRegistryService::new(&state);
    let patient = service.create(request, Some(auth.token())).await?;

    Ok(Json(json!({
        "success": true,
        "patient": patient
    })))
}

#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = PatientRegistryService::new(&state);
    let patients = service.list(Some(auth.token())).await?;

    Ok(Json(json!({ "patients": patients })))
}

#[axum::debug_handler]
pub async fn search_patients(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Query(query): Query<PatientSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let service = PatientRegistryService::new(&state);

    let term = query.q.unwrap_or_default();
    let results = if term.trim().is_empty() {
        // An empty search box shows the whole roster, without annotations.
        let patients = service.list(Some(auth.token())).await?;
        return Ok(Json(json!({ "patients": patients })));
    } else {
        service.search(term.trim(), Some(auth.token())).await?
    };

    Ok(Json(json!({ "patients": results })))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PatientRegistryService::new(&state);
    let patient = service.get(patient_id, Some(auth.token())).await?;

    Ok(Json(json!({ "patient": patient })))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Admin)?;

    let service = PatientRegistryService::new(&state);
    let patient = service
        .update(patient_id, request, Some(auth.token()))
        .await?;

    Ok(Json(json!({
        "success": true,
        "patient": patient
    })))
}
