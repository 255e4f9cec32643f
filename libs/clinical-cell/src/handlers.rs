use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
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

use crate::models::{PrescriptionRequest, RecordDiagnosisRequest};
use crate::services::notes::ClinicalNotesService;

#[axum::debug_handler]
pub async fn record_diagnosis(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RecordDiagnosisRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Doctor)?;

    let doctor_id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::Auth("Token subject is not a valid user id".to_string()))?;

    let service = ClinicalNotesService::new(&state);
    let entry = service
        .record_diagnosis(appointment_id, doctor_id, &request.text, Some(auth.token()))
        .await?;

    Ok(Json(json!({
        "success": true,
        "diagnosis": entry
    })))
}

#[axum::debug_handler]
pub async fn diagnosis_history(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Doctor)?;

    let service = ClinicalNotesService::new(&state);
    let history = service
        .diagnosis_history(appointment_id, Some(auth.token()))
        .await?;

    Ok(Json(json!({ "history": history })))
}

#[axum::debug_handler]
pub async fn upsert_prescription(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<PrescriptionRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Doctor)?;

    let service = ClinicalNotesService::new(&state);
    let prescription = service
        .upsert_prescription(appointment_id, request, Some(auth.token()))
        .await?;

    Ok(Json(json!({
        "success": true,
        "prescription": prescription
    })))
}

#[axum::debug_handler]
pub async fn get_prescription(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Doctor)?;

    let service = ClinicalNotesService::new(&state);
    let prescription = service
        .get_prescription(appointment_id, Some(auth.token()))
        .await?;

    Ok(Json(json!({ "prescription": prescription })))
}
