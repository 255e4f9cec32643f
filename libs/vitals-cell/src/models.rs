use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

/// One row per appointment; a second submission overwrites the first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalSigns {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub weight_kg: Option<f64>,
    pub blood_pressure: Option<String>,
    pub temperature_c: Option<f64>,
    pub heart_rate: Option<i32>,
    pub respiratory_rate: Option<i32>,
    pub oxygen_saturation: Option<i32>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordVitalsRequest {
    pub weight_kg: Option<f64>,
    pub blood_pressure: Option<String>,
    pub temperature_c: Option<f64>,
    pub heart_rate: Option<i32>,
    pub respiratory_rate: Option<i32>,
    pub oxygen_saturation: Option<i32>,
}

#[derive(Error, Debug)]
pub enum VitalsError {
    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("No vital signs recorded for this appointment")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<VitalsError> for AppError {
    fn from(err: VitalsError) -> Self {
        match err {
            VitalsError::AppointmentNotFound | VitalsError::NotFound => {
                AppError::NotFound(err.to_string())
            }
            VitalsError::Database(msg) => AppError::Database(msg),
        }
    }
}
