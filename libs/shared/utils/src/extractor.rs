use std::sync::Arc;

use axum::{extract::State, http::Request, middleware::Next, response::Response, body::Body};

use shared_config::AppConfig;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;

use crate::jwt::validate_token;

// Middleware for authentication
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    if !auth_value.starts_with("Bearer ") {
        return Err(AppError::Auth("Invalid authorization header format".to_string()));
    }

    let token = &auth_value[7..];

    let user = validate_token(token, &config.jwt_secret).map_err(AppError::Auth)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Rejects the request unless the authenticated user holds the given role.
pub fn require_role(user: &User, role: Role) -> Result<(), AppError> {
    match user.role {
        Some(r) if r == role => Ok(()),
        _ => Err(AppError::Forbidden(format!(
            "This action requires the {} role",
            role
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn user_with_role(role: Option<Role>) -> User {
        User {
            id: "u-1".to_string(),
            email: None,
            role,
            full_name: None,
            created_at: None,
        }
    }

    #[test]
    fn matching_role_passes() {
        assert!(require_role(&user_with_role(Some(Role::Admin)), Role::Admin).is_ok());
    }

    #[test]
    fn wrong_role_forbidden() {
        let err = require_role(&user_with_role(Some(Role::Nurse)), Role::Doctor).unwrap_err();
        assert_matches!(err, AppError::Forbidden(_));
    }

    #[test]
    fn missing_role_forbidden() {
        let err = require_role(&user_with_role(None), Role::Admin).unwrap_err();
        assert_matches!(err, AppError::Forbidden(_));
    }
}
