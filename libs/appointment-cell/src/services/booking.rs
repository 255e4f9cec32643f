use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::{Role, User};

use crate::models::{
    Appointment, AppointmentError, AppointmentQuery, AppointmentStatus, BookAppointmentRequest,
    CancelOutcome, UpdateAppointmentRequest,
};
use crate::slot::{evaluate_slot, SlotDecision, SlotPolicy};

pub struct AppointmentBookingService {
    supabase: Arc<SupabaseClient>,
    policy: SlotPolicy,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            policy: SlotPolicy::default(),
        }
    }

    pub fn with_policy(config: &AppConfig, policy: SlotPolicy) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            policy,
        }
    }

    pub async fn book(
        &self,
        request: BookAppointmentRequest,
        auth_token: Option<&str>,
    ) -> Result<Appointment, AppointmentError> {
        self.verify_patient(request.patient_id, auth_token).await?;
        self.verify_doctor(request.doctor_id, auth_token).await?;

        let booked = self
            .active_times(request.doctor_id, request.date, None, auth_token)
            .await?;

        if let SlotDecision::Rejected { reason, open_slots } =
            evaluate_slot(&self.policy, request.time, &booked)
        {
            debug!(
                "Rejected slot {} on {} for doctor {}: {}",
                request.time, request.date, request.doctor_id, reason
            );
            return Err(AppointmentError::SlotRejected { reason, open_slots });
        }

        let row = json!({
            "patient_id": request.patient_id,
            "doctor_id": request.doctor_id,
            "date": request.date,
            "time": request.time,
            "reminder_enabled": request.reminder_enabled,
            "status": AppointmentStatus::Pending,
        });

        let appointment: Appointment = self
            .supabase
            .insert("appointments", auth_token, row)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        info!(
            "Booked appointment {} for patient {} on {} at {}",
            appointment.id, appointment.patient_id, appointment.date, appointment.time
        );
        Ok(appointment)
    }

    pub async fn get(
        &self,
        appointment_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}&select=*", appointment_id);

        let rows: Vec<Appointment> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(AppointmentError::NotFound)
    }

    pub async fn list(
        &self,
        query: AppointmentQuery,
        auth_token: Option<&str>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut path = String::from("/rest/v1/appointments?select=*&order=date.asc,time.asc");

        if let Some(date) = query.date {
            path.push_str(&format!("&date=eq.{}", date));
        }
        if let Some(doctor_id) = query.doctor_id {
            path.push_str(&format!("&doctor_id=eq.{}", doctor_id));
        }
        if let Some(patient_id) = query.patient_id {
            path.push_str(&format!("&patient_id=eq.{}", patient_id));
        }
        if let Some(status) = query.status {
            path.push_str(&format!("&status=eq.{}", status));
        }

        self.supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))
    }

    /// Day view for the dashboards: doctors see only their own column,
    /// admin and nursing staff see the whole day.
    pub async fn agenda(
        &self,
        user: &User,
        date: Option<NaiveDate>,
        auth_token: Option<&str>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let date = date.unwrap_or_else(|| Utc::now().date_naive());

        let doctor_id = match user.role {
            Some(Role::Doctor) => Uuid::parse_str(&user.id).ok(),
            _ => None,
        };

        self.list(
            AppointmentQuery {
                date: Some(date),
                doctor_id,
                patient_id: None,
                status: None,
            },
            auth_token,
        )
        .await
    }

    pub async fn update(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
        auth_token: Option<&str>,
    ) -> Result<Appointment, AppointmentError> {
        let existing = self.get(appointment_id, auth_token).await?;

        // Moving the appointment re-runs the slot policy against the
        // doctor's day, minus this appointment itself.
        if request.date.is_some() || request.time.is_some() {
            let date = request.date.unwrap_or(existing.date);
            let time = request.time.unwrap_or(existing.time);

            let booked = self
                .active_times(existing.doctor_id, date, Some(appointment_id), auth_token)
                .await?;

            if let SlotDecision::Rejected { reason, open_slots } =
                evaluate_slot(&self.policy, time, &booked)
            {
                return Err(AppointmentError::SlotRejected { reason, open_slots });
            }
        }

        let mut patch = Map::new();
        if let Some(date) = request.date {
            patch.insert("date".to_string(), json!(date));
        }
        if let Some(time) = request.time {
            patch.insert("time".to_string(), json!(time));
        }
        if let Some(reminder) = request.reminder_enabled {
            patch.insert("reminder_enabled".to_string(), json!(reminder));
        }
        if let Some(status) = request.status {
            patch.insert("status".to_string(), json!(status));
        }

        if patch.is_empty() {
            return Ok(existing);
        }

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);

        self.supabase
            .update(&path, auth_token, Value::Object(patch))
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))
    }

    pub async fn cancel(
        &self,
        appointment_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<CancelOutcome, AppointmentError> {
        let existing = self.get(appointment_id, auth_token).await?;

        if existing.status == AppointmentStatus::Cancelled {
            return Ok(CancelOutcome {
                appointment: existing,
                already_cancelled: true,
                message: "The appointment was already cancelled".to_string(),
            });
        }

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let appointment: Appointment = self
            .supabase
            .update(
                &path,
                auth_token,
                json!({ "status": AppointmentStatus::Cancelled }),
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        info!("Cancelled appointment {}", appointment_id);

        Ok(CancelOutcome {
            appointment,
            already_cancelled: false,
            message: "Appointment cancelled".to_string(),
        })
    }

    /// Times of the doctor's non-cancelled appointments on one day.
    async fn active_times(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        exclude: Option<Uuid>,
        auth_token: Option<&str>,
    ) -> Result<Vec<NaiveTime>, AppointmentError> {
        let mut path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&status=neq.cancelled&select=id,time",
            doctor_id, date
        );
        if let Some(id) = exclude {
            path.push_str(&format!("&id=neq.{}", id));
        }

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        Ok(rows
            .iter()
            .filter_map(|row| row["time"].as_str())
            .filter_map(|raw| {
                NaiveTime::parse_from_str(raw, "%H:%M:%S")
                    .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
                    .ok()
            })
            .collect())
    }

    async fn verify_patient(
        &self,
        patient_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<(), AppointmentError> {
        let path = format!("/rest/v1/patients?id=eq.{}&select=id", patient_id);

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        if rows.is_empty() {
            return Err(AppointmentError::PatientNotFound);
        }
        Ok(())
    }

    async fn verify_doctor(
        &self,
        doctor_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<(), AppointmentError> {
        let path = format!("/rest/v1/doctors?user_id=eq.{}&select=user_id", doctor_id);

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        if rows.is_empty() {
            return Err(AppointmentError::DoctorNotFound);
        }
        Ok(())
    }
}
