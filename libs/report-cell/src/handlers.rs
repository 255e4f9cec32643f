use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::PeriodQuery;
use crate::services::report::ReportService;

fn pdf_response(file_name: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response()
}

#[axum::debug_handler]
pub async fn prescription_pdf(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Response, AppError> {
    require_role(&user, Role::Doctor)?;

    let service = ReportService::new(&state);
    let bytes = service
        .prescription_pdf(appointment_id, Some(auth.token()))
        .await?;

    let file_name = format!("prescription_{}.pdf", appointment_id);
    Ok(pdf_response(&file_name, bytes))
}

#[axum::debug_handler]
pub async fn history_pdf(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<Uuid>,
) -> Result<Response, AppError> {
    require_role(&user, Role::Doctor)?;

    let service = ReportService::new(&state);
    let bytes = service.history_pdf(patient_id, Some(auth.token())).await?;

    let file_name = format!("history_{}.pdf", patient_id);
    Ok(pdf_response(&file_name, bytes))
}

#[axum::debug_handler]
pub async fn period_pdf(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<PeriodQuery>,
) -> Result<Response, AppError> {
    require_role(&user, Role::Admin)?;

    let service = ReportService::new(&state);
    let bytes = service
        .period_pdf(query.period, query.date, Some(auth.token()))
        .await?;

    Ok(pdf_response("appointments_report.pdf", bytes))
}
