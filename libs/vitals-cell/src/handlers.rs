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

use crate::models::RecordVitalsRequest;
use crate::services::records::VitalSignsService;

/// Nursing staff records vitals during triage.
#[axum::debug_handler]
pub async fn record_vitals(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RecordVitalsRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Nurse)?;

    let service = VitalSignsService::new(&state);
    let vitals = service
        .upsert(appointment_id, request, Some(auth.token()))
        .await?;

    Ok(Json(json!({
        "success": true,
        "vital_signs": vitals
    })))
}

#[axum::debug_handler]
pub async fn get_vitals(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = VitalSignsService::new(&state);
    let vitals = service.get(appointment_id, Some(auth.token())).await?;

    Ok(Json(json!({ "vital_signs": vitals })))
}
