use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{ClinicalError, DiagnosisEntry, Prescription, PrescriptionRequest};

pub struct ClinicalNotesService {
    supabase: Arc<SupabaseClient>,
}

impl ClinicalNotesService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    /// Appends to the history and refreshes the appointment's current
    /// diagnosis text. Earlier entries are never rewritten.
    pub async fn record_diagnosis(
        &self,
        appointment_id: Uuid,
        doctor_id: Uuid,
        text: &str,
        auth_token: Option<&str>,
    ) -> Result<DiagnosisEntry, ClinicalError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClinicalError::EmptyDiagnosis);
        }

        self.verify_appointment(appointment_id, auth_token).await?;

        let row = json!({
            "appointment_id": appointment_id,
            "doctor_id": doctor_id,
            "text": text,
        });

        let entry: DiagnosisEntry = self
            .supabase
            .insert("diagnosis_history", auth_token, row)
            .await
            .map_err(|e| ClinicalError::Database(e.to_string()))?;

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let _: Value = self
            .supabase
            .update(&path, auth_token, json!({ "diagnosis": text }))
            .await
            .map_err(|e| ClinicalError::Database(e.to_string()))?;

        info!("Diagnosis recorded for appointment {}", appointment_id);
        Ok(entry)
    }

    pub async fn diagnosis_history(
        &self,
        appointment_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Vec<DiagnosisEntry>, ClinicalError> {
        let path = format!(
            "/rest/v1/diagnosis_history?appointment_id=eq.{}&select=*&order=recorded_at.desc",
            appointment_id
        );

        self.supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| ClinicalError::Database(e.to_string()))
    }

    pub async fn upsert_prescription(
        &self,
        appointment_id: Uuid,
        request: PrescriptionRequest,
        auth_token: Option<&str>,
    ) -> Result<Prescription, ClinicalError> {
        self.verify_appointment(appointment_id, auth_token).await?;

        let body = json!({
            "diagnosis": request.diagnosis,
            "medications": request.medications,
            "instructions": request.instructions,
        });

        if self.prescription_exists(appointment_id, auth_token).await? {
            debug!("Updating prescription for appointment {}", appointment_id);
            let path = format!(
                "/rest/v1/prescriptions?appointment_id=eq.{}",
                appointment_id
            );
            self.supabase
                .update(&path, auth_token, body)
                .await
                .map_err(|e| ClinicalError::Database(e.to_string()))
        } else {
            debug!("Creating prescription for appointment {}", appointment_id);
            let mut row = body;
            row["appointment_id"] = json!(appointment_id);
            row["issued_on"] = json!(Utc::now().date_naive());
            self.supabase
                .insert("prescriptions", auth_token, row)
                .await
                .map_err(|e| ClinicalError::Database(e.to_string()))
        }
    }

    pub async fn get_prescription(
        &self,
        appointment_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Prescription, ClinicalError> {
        let path = format!(
            "/rest/v1/prescriptions?appointment_id=eq.{}&select=*",
            appointment_id
        );

        let rows: Vec<Prescription> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| ClinicalError::Database(e.to_string()))?;

        rows.into_iter()
            .next()
            .ok_or(ClinicalError::PrescriptionNotFound)
    }

    async fn prescription_exists(
        &self,
        appointment_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<bool, ClinicalError> {
        let path = format!(
            "/rest/v1/prescriptions?appointment_id=eq.{}&select=id",
            appointment_id
        );

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| ClinicalError::Database(e.to_string()))?;

        Ok(!rows.is_empty())
    }

    async fn verify_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<(), ClinicalError> {
        let path = format!("/rest/v1/appointments?id=eq.{}&select=id", appointment_id);

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| ClinicalError::Database(e.to_string()))?;

        if rows.is_empty() {
            return Err(ClinicalError::AppointmentNotFound);
        }
        Ok(())
    }
}
