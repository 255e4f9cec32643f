use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{RecordVitalsRequest, VitalSigns, VitalsError};

pub struct VitalSignsService {
    supabase: Arc<SupabaseClient>,
}

impl VitalSignsService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    /// Insert on first submission, patch afterwards. Recording vitals is the
    /// triage step, so the appointment moves to `attended` either way.
    pub async fn upsert(
        &self,
        appointment_id: Uuid,
        request: RecordVitalsRequest,
        auth_token: Option<&str>,
    ) -> Result<VitalSigns, VitalsError> {
        self.verify_appointment(appointment_id, auth_token).await?;

        let body = json!({
            "weight_kg": request.weight_kg,
            "blood_pressure": request.blood_pressure,
            "temperature_c": request.temperature_c,
            "heart_rate": request.heart_rate,
            "respiratory_rate": request.respiratory_rate,
            "oxygen_saturation": request.oxygen_saturation,
        });

        let vitals = if self.exists(appointment_id, auth_token).await? {
            debug!("Updating vital signs for appointment {}", appointment_id);
            let path = format!("/rest/v1/vital_signs?appointment_id=eq.{}", appointment_id);
            self.supabase
                .update(&path, auth_token, body)
                .await
                .map_err(|e| VitalsError::Database(e.to_string()))?
        } else {
            debug!("Recording vital signs for appointment {}", appointment_id);
            let mut row = body;
            row["appointment_id"] = json!(appointment_id);
            self.supabase
                .insert("vital_signs", auth_token, row)
                .await
                .map_err(|e| VitalsError::Database(e.to_string()))?
        };

        self.mark_attended(appointment_id, auth_token).await?;

        info!("Vital signs stored for appointment {}", appointment_id);
        Ok(vitals)
    }

    pub async fn get(
        &self,
        appointment_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<VitalSigns, VitalsError> {
        let path = format!(
            "/rest/v1/vital_signs?appointment_id=eq.{}&select=*",
            appointment_id
        );

        let rows: Vec<VitalSigns> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| VitalsError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(VitalsError::NotFound)
    }

    async fn exists(
        &self,
        appointment_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<bool, VitalsError> {
        let path = format!(
            "/rest/v1/vital_signs?appointment_id=eq.{}&select=id",
            appointment_id
        );

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| VitalsError::Database(e.to_string()))?;

        Ok(!rows.is_empty())
    }

    async fn verify_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<(), VitalsError> {
        let path = format!("/rest/v1/appointments?id=eq.{}&select=id", appointment_id);

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| VitalsError::Database(e.to_string()))?;

        if rows.is_empty() {
            return Err(VitalsError::AppointmentNotFound);
        }
        Ok(())
    }

    async fn mark_attended(
        &self,
        appointment_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<(), VitalsError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);

        let _: Value = self
            .supabase
            .update(&path, auth_token, json!({ "status": "attended" }))
            .await
            .map_err(|e| VitalsError::Database(e.to_string()))?;

        Ok(())
    }
}
