use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn clinical_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route(
            "/appointments/{appointment_id}/diagnosis",
            post(handlers::record_diagnosis),
        )
        .route(
            "/appointments/{appointment_id}/diagnosis/history",
            get(handlers::diagnosis_history),
        )
        .route(
            "/appointments/{appointment_id}/prescription",
            put(handlers::upsert_prescription),
        )
        .route(
            "/appointments/{appointment_id}/prescription",
            get(handlers::get_prescription),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
