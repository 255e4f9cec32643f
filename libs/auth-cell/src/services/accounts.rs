use std::sync::Arc;

use chrono::Duration;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::{Role, User};

use doctor_cell::services::profile::DoctorProfileService;

use crate::models::{
    AccountRecord, AuthError, LoginRequest, LoginResponse, RegisterRequest, UserProfile,
};
use crate::services::password::PasswordService;

const TOKEN_VALIDITY_HOURS: i64 = 24;

pub struct AccountService {
    supabase: Arc<SupabaseClient>,
    profile_service: DoctorProfileService,
    jwt_secret: String,
}

impl AccountService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            profile_service: DoctorProfileService::new(config),
            jwt_secret: config.jwt_secret.clone(),
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<UserProfile, AuthError> {
        if request.password != request.password_confirm {
            return Err(AuthError::PasswordMismatch);
        }

        if self.username_exists(&request.username).await? {
            return Err(AuthError::UsernameTaken);
        }

        if self.email_exists(&request.email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = PasswordService::hash_password(&request.password)
            .map_err(|e| AuthError::Database(format!("Password hashing failed: {}", e)))?;

        let row = json!({
            "username": request.username,
            "email": request.email,
            "password_hash": password_hash,
            "first_name": request.first_name,
            "last_name": request.last_name,
            "role": request.role,
        });

        let record: AccountRecord = self
            .supabase
            .insert("users", None, row)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        info!("Registered account {} with role {}", record.username, record.role);
        Ok(record.into())
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let record = self
            .find_by_username(&request.username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let valid = PasswordService::verify_password(&request.password, &record.password_hash)
            .map_err(|e| AuthError::Database(format!("Password verification failed: {}", e)))?;

        if !valid {
            debug!("Bad password for account {}", request.username);
            return Err(AuthError::InvalidCredentials);
        }

        // The sign-in screen asks for a role; the account must actually hold it.
        if record.role != request.role {
            debug!(
                "Account {} holds role {} but {} was requested",
                record.username, record.role, request.role
            );
            return Err(AuthError::RoleMismatch);
        }

        // A doctor gets a practice profile on first login.
        if record.role == Role::Doctor {
            self.profile_service
                .ensure_profile(record.id, None)
                .await
                .map_err(|e| AuthError::Database(e.to_string()))?;
        }

        let user = User {
            id: record.id.to_string(),
            email: Some(record.email.clone()),
            role: Some(record.role),
            full_name: Some(record.full_name()),
            created_at: Some(record.created_at),
        };

        let token = shared_utils::jwt::issue_token(
            &user,
            &self.jwt_secret,
            Duration::hours(TOKEN_VALIDITY_HOURS),
        )
        .map_err(AuthError::Database)?;

        info!("Account {} signed in as {}", record.username, record.role);

        Ok(LoginResponse {
            token,
            user: record.into(),
        })
    }

    pub async fn profile(&self, user_id: &str) -> Result<UserProfile, AuthError> {
        let path = format!(
            "/rest/v1/users?id=eq.{}&select=*",
            urlencoding::encode(user_id)
        );

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        let row = rows.into_iter().next().ok_or(AuthError::NotFound)?;
        let record: AccountRecord = serde_json::from_value(row)
            .map_err(|e| AuthError::Database(format!("Malformed account row: {}", e)))?;

        Ok(record.into())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<AccountRecord>, AuthError> {
        let path = format!(
            "/rest/v1/users?username=eq.{}&select=*",
            urlencoding::encode(username)
        );

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        match rows.into_iter().next() {
            Some(row) => {
                let record = serde_json::from_value(row)
                    .map_err(|e| AuthError::Database(format!("Malformed account row: {}", e)))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AuthError> {
        let path = format!(
            "/rest/v1/users?username=eq.{}&select=id",
            urlencoding::encode(username)
        );

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(!rows.is_empty())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let path = format!(
            "/rest/v1/users?email=eq.{}&select=id",
            urlencoding::encode(email)
        );

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(!rows.is_empty())
    }
}
