use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub age: Option<i32>,
    pub birth_date: NaiveDate,
    pub place_of_origin: Option<String>,
    pub phone: Option<String>,
    pub first_visit: NaiveDate,
    /// Clinic-assigned identifier, `P0001` onward.
    pub code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePatientRequest {
    pub first_name: String,
    pub last_name: String,
    pub age: Option<i32>,
    pub birth_date: NaiveDate,
    pub place_of_origin: Option<String>,
    pub phone: Option<String>,
    pub first_visit: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePatientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub birth_date: Option<NaiveDate>,
    pub place_of_origin: Option<String>,
    pub phone: Option<String>,
    pub first_visit: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct PatientSearchQuery {
    pub q: Option<String>,
}

/// Search result row, annotated with the patient's most recent appointment.
#[derive(Debug, Serialize)]
pub struct PatientWithLastVisit {
    #[serde(flatten)]
    pub patient: Patient,
    pub last_appointment: Option<NaiveDate>,
}

#[derive(Error, Debug)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("Phone number is already registered to another patient")]
    PhoneTaken,

    #[error("Birth date cannot be in the future")]
    BirthDateInFuture,

    #[error("Nothing to update")]
    EmptyUpdate,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound => AppError::NotFound(err.to_string()),
            PatientError::PhoneTaken => AppError::Conflict(err.to_string()),
            PatientError::BirthDateInFuture | PatientError::EmptyUpdate => {
                AppError::ValidationError(err.to_string())
            }
            PatientError::Database(msg) => AppError::Database(msg),
        }
    }
}
