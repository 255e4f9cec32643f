use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn vitals_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/{appointment_id}", put(handlers::record_vitals))
        .route("/{appointment_id}", get(handlers::get_vitals))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
