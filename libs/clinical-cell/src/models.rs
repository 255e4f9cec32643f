use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

/// Append-only log. Each diagnosis revision keeps the earlier entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisEntry {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub doctor_id: Uuid,
    pub text: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RecordDiagnosisRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub diagnosis: String,
    pub medications: String,
    pub instructions: Option<String>,
    pub issued_on: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct PrescriptionRequest {
    pub diagnosis: String,
    pub medications: String,
    pub instructions: Option<String>,
}

#[derive(Error, Debug)]
pub enum ClinicalError {
    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("Diagnosis text must not be empty")]
    EmptyDiagnosis,

    #[error("No prescription exists for this appointment")]
    PrescriptionNotFound,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<ClinicalError> for AppError {
    fn from(err: ClinicalError) -> Self {
        match err {
            ClinicalError::AppointmentNotFound | ClinicalError::PrescriptionNotFound => {
                AppError::NotFound(err.to_string())
            }
            ClinicalError::EmptyDiagnosis => AppError::ValidationError(err.to_string()),
            ClinicalError::Database(msg) => AppError::Database(msg),
        }
    }
}
