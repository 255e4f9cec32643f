use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{Role, User};

use crate::jwt::issue_token;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub media_root: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            media_root: "media".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            media_root: self.media_root.clone(),
            allowed_origins: vec![],
            debug: true,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl TestUser {
    pub fn new(email: &str, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role,
        }
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, Role::Admin)
    }

    pub fn nurse(email: &str) -> Self {
        Self::new(email, Role::Nurse)
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, Role::Doctor)
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role),
            full_name: Some("Test User".to_string()),
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        issue_token(
            &user.to_user(),
            secret,
            Duration::hours(exp_hours.unwrap_or(24)),
        )
        .expect("token signing should not fail in tests")
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub struct MockClinicRows;

impl MockClinicRows {
    pub fn user_row(id: &str, username: &str, role: &str) -> serde_json::Value {
        json!({
            "id": id,
            "username": username,
            "email": format!("{}@clinic.test", username),
            "password_hash": "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$hashhashhash",
            "first_name": "Test",
            "last_name": "User",
            "role": role,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn patient_row(id: &str, code: &str) -> serde_json::Value {
        json!({
            "id": id,
            "first_name": "Maria",
            "last_name": "Lopez",
            "age": 34,
            "birth_date": "1990-05-12",
            "place_of_origin": "Oaxaca",
            "phone": "5512345678",
            "first_visit": "2024-01-15",
            "code": code,
            "created_at": "2024-01-15T00:00:00Z"
        })
    }

    pub fn doctor_row(user_id: &str) -> serde_json::Value {
        json!({
            "user_id": user_id,
            "specialty": "General",
            "license_number": "PENDING",
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn appointment_row(
        id: &str,
        patient_id: &str,
        doctor_id: &str,
        date: &str,
        time: &str,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "date": date,
            "time": time,
            "reminder_enabled": false,
            "status": status,
            "diagnosis": null,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn vitals_row(appointment_id: &str) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "appointment_id": appointment_id,
            "weight_kg": 68.5,
            "blood_pressure": "120/80",
            "temperature_c": 36.7,
            "heart_rate": 72,
            "respiratory_rate": 16,
            "oxygen_saturation": 98,
            "recorded_at": "2024-01-15T10:00:00Z"
        })
    }

    pub fn prescription_row(appointment_id: &str) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "appointment_id": appointment_id,
            "diagnosis": "Seasonal rhinitis",
            "medications": "Loratadine 10mg",
            "instructions": "One tablet every 24 hours for 5 days",
            "issued_on": "2024-01-15"
        })
    }

    pub fn study_row(patient_id: &str, file_name: &str) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "patient_id": patient_id,
            "file_name": file_name,
            "stored_path": format!("studies/{}", file_name),
            "description": "lab results",
            "extracted_text": "sample extracted text",
            "uploaded_at": "2024-01-15T11:00:00Z"
        })
    }
}
