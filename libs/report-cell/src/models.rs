use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use appointment_cell::models::Appointment;
use clinical_cell::models::{DiagnosisEntry, Prescription};
use patient_cell::models::Patient;
use shared_models::error::AppError;
use study_cell::models::Study;
use vitals_cell::models::VitalSigns;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
}

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period: Period,
    pub date: Option<NaiveDate>,
}

/// Everything the prescription PDF needs, gathered in one pass.
#[derive(Debug)]
pub struct PrescriptionDocument {
    pub patient: Patient,
    pub appointment: Appointment,
    pub prescription: Prescription,
    pub doctor_name: String,
    pub vitals: Option<VitalSigns>,
}

/// Data backing the clinical history PDF.
#[derive(Debug)]
pub struct HistoryDocument {
    pub patient: Patient,
    pub appointments: Vec<Appointment>,
    pub vitals: Vec<VitalSigns>,
    pub recent_diagnoses: Vec<DiagnosisEntry>,
    pub recent_prescriptions: Vec<Prescription>,
    pub studies: Vec<Study>,
}

/// One line of the periodic appointment report.
#[derive(Debug)]
pub struct ReportRow {
    pub appointment: Appointment,
    pub patient_name: String,
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("No prescription exists for this appointment")]
    PrescriptionNotFound,

    #[error("Could not render the document: {0}")]
    Render(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::AppointmentNotFound
            | ReportError::PatientNotFound
            | ReportError::PrescriptionNotFound => AppError::NotFound(err.to_string()),
            ReportError::Render(msg) => AppError::Internal(msg),
            ReportError::Database(msg) => AppError::Database(msg),
        }
    }
}
