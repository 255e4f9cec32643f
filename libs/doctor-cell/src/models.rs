use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

/// Practice profile. Keyed by the owning account, one per doctor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub user_id: Uuid,
    pub specialty: String,
    pub license_number: String,
    pub created_at: DateTime<Utc>,
}

/// Names come embedded from the `users` table.
#[derive(Debug, Clone, Deserialize)]
pub struct DoctorRow {
    pub user_id: Uuid,
    pub specialty: String,
    pub license_number: String,
    pub created_at: DateTime<Utc>,
    pub users: Option<DoctorNameRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoctorNameRow {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorListing {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub specialty: String,
    pub license_number: String,
}

impl From<DoctorRow> for DoctorListing {
    fn from(row: DoctorRow) -> Self {
        let (first_name, last_name) = row
            .users
            .map(|n| (n.first_name, n.last_name))
            .unwrap_or_default();

        Self {
            user_id: row.user_id,
            first_name,
            last_name,
            specialty: row.specialty,
            license_number: row.license_number,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateDoctorRequest {
    pub specialty: Option<String>,
    pub license_number: Option<String>,
}

#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Nothing to update")]
    EmptyUpdate,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound(err.to_string()),
            DoctorError::EmptyUpdate => AppError::BadRequest(err.to_string()),
            DoctorError::Database(msg) => AppError::Database(msg),
        }
    }
}
