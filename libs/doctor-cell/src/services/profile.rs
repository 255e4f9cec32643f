use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{DoctorError, DoctorListing, DoctorProfile, DoctorRow, UpdateDoctorRequest};

const DEFAULT_SPECIALTY: &str = "General";
const LICENSE_PLACEHOLDER: &str = "PENDING";

pub struct DoctorProfileService {
    supabase: Arc<SupabaseClient>,
}

impl DoctorProfileService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    /// Creates the practice profile on first sign-in; later calls are no-ops.
    pub async fn ensure_profile(
        &self,
        user_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<DoctorProfile, DoctorError> {
        let path = format!("/rest/v1/doctors?user_id=eq.{}&select=*", user_id);

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        if let Some(row) = rows.into_iter().next() {
            debug!("Doctor {} already has a profile", user_id);
            return serde_json::from_value(row)
                .map_err(|e| DoctorError::Database(format!("Malformed doctor row: {}", e)));
        }

        let row = json!({
            "user_id": user_id,
            "specialty": DEFAULT_SPECIALTY,
            "license_number": LICENSE_PLACEHOLDER,
        });

        let profile: DoctorProfile = self
            .supabase
            .insert("doctors", auth_token, row)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        info!("Created practice profile for doctor {}", user_id);
        Ok(profile)
    }

    pub async fn list(&self, auth_token: Option<&str>) -> Result<Vec<DoctorListing>, DoctorError> {
        let path = "/rest/v1/doctors?select=*,users(first_name,last_name)&order=created_at.asc";

        let rows: Vec<DoctorRow> = self
            .supabase
            .request(Method::GET, path, auth_token, None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(DoctorListing::from).collect())
    }

    pub async fn get(
        &self,
        user_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<DoctorListing, DoctorError> {
        let path = format!(
            "/rest/v1/doctors?user_id=eq.{}&select=*,users(first_name,last_name)",
            user_id
        );

        let rows: Vec<DoctorRow> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        rows.into_iter()
            .next()
            .map(DoctorListing::from)
            .ok_or(DoctorError::NotFound)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        request: UpdateDoctorRequest,
        auth_token: Option<&str>,
    ) -> Result<DoctorProfile, DoctorError> {
        let mut patch = Map::new();
        if let Some(specialty) = request.specialty {
            patch.insert("specialty".to_string(), json!(specialty));
        }
        if let Some(license_number) = request.license_number {
            patch.insert("license_number".to_string(), json!(license_number));
        }

        if patch.is_empty() {
            return Err(DoctorError::EmptyUpdate);
        }

        let path = format!("/rest/v1/doctors?user_id=eq.{}", user_id);

        self.supabase
            .update(&path, auth_token, Value::Object(patch))
            .await
            .map_err(|e| {
                if e.to_string().contains("matched no rows") {
                    DoctorError::NotFound
                } else {
                    DoctorError::Database(e.to_string())
                }
            })
    }
}
