use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

/// An uploaded medical study: the stored file plus whatever text could be
/// pulled out of it for searching and the clinical history document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Study {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub file_name: String,
    pub stored_path: String,
    pub description: Option<String>,
    pub extracted_text: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Error, Debug)]
pub enum StudyError {
    #[error("Patient not found")]
    PatientNotFound,

    #[error("No file was attached to the upload")]
    MissingFile,

    #[error("Could not store the file: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<StudyError> for AppError {
    fn from(err: StudyError) -> Self {
        match err {
            StudyError::PatientNotFound => AppError::NotFound(err.to_string()),
            StudyError::MissingFile => AppError::BadRequest(err.to_string()),
            StudyError::Storage(msg) => AppError::Internal(msg),
            StudyError::Database(msg) => AppError::Database(msg),
        }
    }
}
