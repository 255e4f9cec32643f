use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{TokenResponse, User};
use shared_models::error::AppError;
use shared_utils::jwt::validate_token;

use crate::models::{LoginRequest, RegisterRequest};
use crate::services::accounts::AccountService;

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Value>, AppError> {
    if request.username.trim().is_empty() {
        return Err(AppError::ValidationError("Username must not be empty".to_string()));
    }

    let service = AccountService::new(&state);
    let profile = service.register(request).await?;

    Ok(Json(json!({
        "success": true,
        "user": profile
    })))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AccountService::new(&state);
    let response = service.login(request).await?;

    Ok(Json(json!({
        "success": true,
        "token": response.token,
        "user": response.user
    })))
}

/// Stateless token check for clients that want to know whether a stored
/// token is still usable.
#[axum::debug_handler]
pub async fn validate(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = validate_token(auth.token(), &state.jwt_secret).map_err(AppError::Auth)?;

    Ok(Json(TokenResponse {
        valid: true,
        user_id: user.id,
        email: user.email,
        role: user.role,
    }))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    Uuid::parse_str(&user.id)
        .map_err(|_| AppError::Auth("Token subject is not a valid user id".to_string()))?;

    let service = AccountService::new(&state);
    let profile = service.profile(&user.id).await?;

    Ok(Json(json!({ "user": profile })))
}
