use std::sync::Arc;

use axum::{
    extract::{Extension, Multipart, Path, State},
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

use crate::models::StudyError;
use crate::services::archive::StudyArchiveService;

/// Multipart upload: a `file` part plus an optional `description` part.
#[axum::debug_handler]
pub async fn upload_study(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Doctor)?;

    let mut description: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        match field.name().unwrap_or("") {
            "description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Unreadable field: {}", e)))?;
                if !text.trim().is_empty() {
                    description = Some(text);
                }
            }
            "file" => {
                let file_name = field.file_name().unwrap_or("study").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Unreadable file: {}", e)))?;
                file = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| AppError::from(StudyError::MissingFile))?;

    let service = StudyArchiveService::new(&state);
    let study = service
        .store(patient_id, &file_name, &bytes, description, Some(auth.token()))
        .await?;

    Ok(Json(json!({
        "success": true,
        "study": study
    })))
}

#[axum::debug_handler]
pub async fn list_studies(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Doctor)?;

    let service = StudyArchiveService::new(&state);
    let studies = service.list(patient_id, Some(auth.token())).await?;

    Ok(Json(json!({ "studies": studies })))
}
