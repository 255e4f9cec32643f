use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn study_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/patients/{patient_id}", post(handlers::upload_study))
        .route("/patients/{patient_id}", get(handlers::list_studies))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
