use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
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

use crate::models::{
    AgendaQuery, AppointmentError, AppointmentQuery, BookAppointmentRequest,
    UpdateAppointmentRequest,
};
use crate::services::booking::AppointmentBookingService;

/// A rejected slot answers 409 with the reason and the rest of the day's
/// availability, so the scheduling screen can offer alternatives.
fn slot_rejection_response(reason: String, open_slots: Vec<chrono::NaiveTime>) -> Response {
    let times: Vec<String> = open_slots
        .iter()
        .map(|slot| slot.format("%H:%M").to_string())
        .collect();

    (
        StatusCode::CONFLICT,
        Json(json!({
            "error": reason,
            "open_slots": times
        })),
    )
        .into_response()
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Response, AppError> {
    require_role(&user, Role::Admin)?;

    let service = AppointmentBookingService::new(&state);

    match service.book(request, Some(auth.token())).await {
        Ok(appointment) => Ok(Json(json!({
            "success": true,
            "appointment": appointment
        }))
        .into_response()),
        Err(AppointmentError::SlotRejected { reason, open_slots }) => {
            Ok(slot_rejection_response(reason, open_slots))
        }
        Err(e) => Err(e.into()),
    }
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Query(query): Query<AppointmentQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&state);
    let appointments = service.list(query, Some(auth.token())).await?;

    Ok(Json(json!({ "appointments": appointments })))
}

#[axum::debug_handler]
pub async fn get_agenda(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<AgendaQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&state);
    let appointments = service
        .agenda(&user, query.date, Some(auth.token()))
        .await?;

    Ok(Json(json!({ "appointments": appointments })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&state);
    let appointment = service.get(appointment_id, Some(auth.token())).await?;

    Ok(Json(json!({ "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Response, AppError> {
    require_role(&user, Role::Admin)?;

    let service = AppointmentBookingService::new(&state);

    match service
        .update(appointment_id, request, Some(auth.token()))
        .await
    {
        Ok(appointment) => Ok(Json(json!({
            "success": true,
            "appointment": appointment
        }))
        .into_response()),
        Err(AppointmentError::SlotRejected { reason, open_slots }) => {
            Ok(slot_rejection_response(reason, open_slots))
        }
        Err(e) => Err(e.into()),
    }
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Admin)?;

    let service = AppointmentBookingService::new(&state);
    let outcome = service.cancel(appointment_id, Some(auth.token())).await?;

    Ok(Json(json!({
        "success": true,
        "already_cancelled": outcome.already_cancelled,
        "message": outcome.message,
        "appointment": outcome.appointment
    })))
}
