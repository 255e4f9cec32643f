use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use clinical_cell::router::clinical_routes;
use doctor_cell::router::doctor_routes;
use patient_cell::router::patient_routes;
use report_cell::router::report_routes;
use shared_config::AppConfig;
use study_cell::router::study_routes;
use vitals_cell::router::vitals_routes;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/patients", patient_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/vitals", vitals_routes(state.clone()))
        .nest("/clinical", clinical_routes(state.clone()))
        .nest("/studies", study_routes(state.clone()))
        .nest("/reports", report_routes(state))
}
