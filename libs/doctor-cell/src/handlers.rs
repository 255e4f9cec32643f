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

use crate::models::UpdateDoctorRequest;
use crate::services::profile::DoctorProfileService;

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorProfileService::new(&state);
    let doctors = service.list(Some(auth.token())).await?;

    Ok(Json(json!({ "doctors": doctors })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorProfileService::new(&state);
    let doctor = service.get(doctor_id, Some(auth.token())).await?;

    Ok(Json(json!({ "doctor": doctor })))
}

/// Admins maintain the roster; a doctor may edit their own profile.
#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let is_self = user.id == doctor_id.to_string();
    if !is_self {
        require_role(&user, Role::Admin)?;
    }

    let service = DoctorProfileService::new(&state);
    let profile = service
        .update(doctor_id, request, Some(auth.token()))
        .await?;

    Ok(Json(json!({
        "success": true,
        "doctor": profile
    })))
}
