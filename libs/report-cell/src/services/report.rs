use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use appointment_cell::models::Appointment;
use clinical_cell::models::{DiagnosisEntry, Prescription};
use patient_cell::models::Patient;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use study_cell::models::Study;
use vitals_cell::models::VitalSigns;

use crate::models::{HistoryDocument, Period, PrescriptionDocument, ReportError, ReportRow};
use crate::services::{pdf, period::period_range};

#[derive(Debug, Deserialize)]
struct DoctorNameRow {
    first_name: String,
    last_name: String,
}

/// Appointment row with the patient's name embedded by PostgREST.
#[derive(Debug, Deserialize)]
struct EmbeddedAppointmentRow {
    #[serde(flatten)]
    appointment: Appointment,
    patients: Option<PatientNameRow>,
}

#[derive(Debug, Deserialize)]
struct PatientNameRow {
    first_name: String,
    last_name: String,
}

pub struct ReportService {
    supabase: Arc<SupabaseClient>,
}

impl ReportService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    /// Builds the prescription PDF for an appointment and marks the
    /// appointment attended, since printing happens at the end of a visit.
    pub async fn prescription_pdf(
        &self,
        appointment_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Vec<u8>, ReportError> {
        let appointment = self.fetch_appointment(appointment_id, auth_token).await?;
        let patient = self.fetch_patient(appointment.patient_id, auth_token).await?;
        let prescription = self.fetch_prescription(appointment_id, auth_token).await?;
        let doctor_name = self.fetch_doctor_name(appointment.doctor_id, auth_token).await?;
        let vitals = self.fetch_appointment_vitals(appointment_id, auth_token).await?;

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let _: Value = self
            .supabase
            .update(&path, auth_token, json!({ "status": "attended" }))
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?;

        info!("Prescription printed for appointment {}", appointment_id);

        let document = PrescriptionDocument {
            patient,
            appointment,
            prescription,
            doctor_name,
            vitals,
        };
        pdf::render_prescription(&document)
    }

    /// Full clinical history for one patient as a PDF.
    pub async fn history_pdf(
        &self,
        patient_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Vec<u8>, ReportError> {
        let patient = self.fetch_patient(patient_id, auth_token).await?;

        let path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&select=*&order=date.desc,time.desc",
            patient_id
        );
        let appointments: Vec<Appointment> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?;

        let vitals = self.fetch_vitals(&appointments, auth_token).await?;
        let recent_diagnoses = self.fetch_recent_diagnoses(&appointments, auth_token).await?;
        let recent_prescriptions = self
            .fetch_recent_prescriptions(&appointments, auth_token)
            .await?;

        let path = format!(
            "/rest/v1/studies?patient_id=eq.{}&select=*&order=uploaded_at.desc",
            patient_id
        );
        let studies: Vec<Study> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?;

        let document = HistoryDocument {
            patient,
            appointments,
            vitals,
            recent_diagnoses,
            recent_prescriptions,
            studies,
        };
        pdf::render_history(&document)
    }

    /// Appointment listing for a day, week or month as a PDF. The anchor
    /// date defaults to today.
    pub async fn period_pdf(
        &self,
        period: Period,
        anchor: Option<NaiveDate>,
        auth_token: Option<&str>,
    ) -> Result<Vec<u8>, ReportError> {
        let anchor = anchor.unwrap_or_else(|| Utc::now().date_naive());
        let (start, end) = period_range(period, anchor);

        let path = format!(
            "/rest/v1/appointments?date=gte.{}&date=lte.{}&select=*,patients(first_name,last_name)&order=date.asc,time.asc",
            start, end
        );
        let rows: Vec<EmbeddedAppointmentRow> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?;

        let rows: Vec<ReportRow> = rows
            .into_iter()
            .map(|row| {
                let patient_name = row
                    .patients
                    .map(|p| format!("{} {}", p.first_name, p.last_name))
                    .unwrap_or_else(|| "Unknown patient".to_string());
                ReportRow {
                    appointment: row.appointment,
                    patient_name,
                }
            })
            .collect();

        let title = match period {
            Period::Day => format!("APPOINTMENTS {}", start),
            Period::Week => format!("APPOINTMENTS WEEK {} TO {}", start, end),
            Period::Month => format!("APPOINTMENTS {}", start.format("%B %Y").to_string().to_uppercase()),
        };
        pdf::render_period_report(&title, &rows)
    }

    async fn fetch_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Appointment, ReportError> {
        let path = format!("/rest/v1/appointments?id=eq.{}&select=*", appointment_id);

        let rows: Vec<Appointment> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(ReportError::AppointmentNotFound)
    }

    async fn fetch_patient(
        &self,
        patient_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Patient, ReportError> {
        let path = format!("/rest/v1/patients?id=eq.{}&select=*", patient_id);

        let rows: Vec<Patient> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(ReportError::PatientNotFound)
    }

    async fn fetch_prescription(
        &self,
        appointment_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Prescription, ReportError> {
        let path = format!(
            "/rest/v1/prescriptions?appointment_id=eq.{}&select=*",
            appointment_id
        );

        let rows: Vec<Prescription> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(ReportError::PrescriptionNotFound)
    }

    async fn fetch_doctor_name(
        &self,
        doctor_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<String, ReportError> {
        // appointments.doctor_id points at the doctor's user row.
        let path = format!(
            "/rest/v1/users?id=eq.{}&select=first_name,last_name",
            doctor_id
        );

        let rows: Vec<DoctorNameRow> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .next()
            .map(|u| format!("{} {}", u.first_name, u.last_name))
            .unwrap_or_else(|| "Unknown doctor".to_string()))
    }

    async fn fetch_appointment_vitals(
        &self,
        appointment_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Option<VitalSigns>, ReportError> {
        let path = format!(
            "/rest/v1/vital_signs?appointment_id=eq.{}&select=*",
            appointment_id
        );

        let rows: Vec<VitalSigns> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))?;

        Ok(rows.into_iter().next())
    }

    async fn fetch_vitals(
        &self,
        appointments: &[Appointment],
        auth_token: Option<&str>,
    ) -> Result<Vec<VitalSigns>, ReportError> {
        if appointments.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = appointments.iter().map(|a| a.id.to_string()).collect();
        let path = format!(
            "/rest/v1/vital_signs?appointment_id=in.({})&select=*&order=recorded_at.desc",
            ids.join(",")
        );

        self.supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))
    }

    async fn fetch_recent_diagnoses(
        &self,
        appointments: &[Appointment],
        auth_token: Option<&str>,
    ) -> Result<Vec<DiagnosisEntry>, ReportError> {
        if appointments.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = appointments.iter().map(|a| a.id.to_string()).collect();
        let path = format!(
            "/rest/v1/diagnosis_history?appointment_id=in.({})&select=*&order=recorded_at.desc&limit=5",
            ids.join(",")
        );

        self.supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))
    }

    async fn fetch_recent_prescriptions(
        &self,
        appointments: &[Appointment],
        auth_token: Option<&str>,
    ) -> Result<Vec<Prescription>, ReportError> {
        if appointments.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = appointments.iter().map(|a| a.id.to_string()).collect();
        let path = format!(
            "/rest/v1/prescriptions?appointment_id=in.({})&select=*&order=issued_on.desc&limit=5",
            ids.join(",")
        );

        self.supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| ReportError::Database(e.to_string()))
    }
}
