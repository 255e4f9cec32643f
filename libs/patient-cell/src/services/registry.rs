use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    CreatePatientRequest, Patient, PatientError, PatientWithLastVisit, UpdatePatientRequest,
};

pub struct PatientRegistryService {
    supabase: Arc<SupabaseClient>,
}

impl PatientRegistryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    /// Next code in the `P0001` sequence. Codes are assigned in insertion
    /// order, so the newest row carries the numeric maximum; sorting by the
    /// code text would misrank `P10000` below `P9999`.
    pub async fn next_code(&self, auth_token: Option<&str>) -> Result<String, PatientError> {
        let path = "/rest/v1/patients?select=code&order=created_at.desc&limit=1";

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, path, auth_token, None)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        let last = rows
            .first()
            .and_then(|row| row["code"].as_str())
            .and_then(parse_code_number)
            .unwrap_or(0);

        Ok(format!("P{:04}", last + 1))
    }

    pub async fn create(
        &self,
        request: CreatePatientRequest,
        auth_token: Option<&str>,
    ) -> Result<Patient, PatientError> {
        let today = Utc::now().date_naive();
        if request.birth_date > today {
            return Err(PatientError::BirthDateInFuture);
        }

        // Phones are optional; only a real number participates in the
        // uniqueness check.
        if let Some(phone) = request.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            if self.phone_exists(phone, None, auth_token).await? {
                return Err(PatientError::PhoneTaken);
            }
        }

        let code = self.next_code(auth_token).await?;
        let first_visit = request.first_visit.unwrap_or(today);

        let row = json!({
            "first_name": request.first_name,
            "last_name": request.last_name,
            "age": request.age,
            "birth_date": request.birth_date,
            "place_of_origin": request.place_of_origin,
            "phone": request.phone,
            "first_visit": first_visit,
            "code": code,
        });

        let patient: Patient = self
            .supabase
            .insert("patients", auth_token, row)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        info!("Registered patient {} ({})", patient.code, patient.id);
        Ok(patient)
    }

    pub async fn get(
        &self,
        patient_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Patient, PatientError> {
        let path = format!("/rest/v1/patients?id=eq.{}&select=*", patient_id);

        let rows: Vec<Patient> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(PatientError::NotFound)
    }

    pub async fn list(&self, auth_token: Option<&str>) -> Result<Vec<Patient>, PatientError> {
        let path = "/rest/v1/patients?select=*&order=code.asc";

        self.supabase
            .request(Method::GET, path, auth_token, None)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))
    }

    pub async fn update(
        &self,
        patient_id: Uuid,
        request: UpdatePatientRequest,
        auth_token: Option<&str>,
    ) -> Result<Patient, PatientError> {
        let today = Utc::now().date_naive();
        if let Some(birth_date) = request.birth_date {
            if birth_date > today {
                return Err(PatientError::BirthDateInFuture);
            }
        }

        if let Some(phone) = request.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            if self
                .phone_exists(phone, Some(patient_id), auth_token)
                .await?
            {
                return Err(PatientError::PhoneTaken);
            }
        }

        let mut patch = Map::new();
        if let Some(v) = request.first_name {
            patch.insert("first_name".to_string(), json!(v));
        }
        if let Some(v) = request.last_name {
            patch.insert("last_name".to_string(), json!(v));
        }
        if let Some(v) = request.age {
            patch.insert("age".to_string(), json!(v));
        }
        if let Some(v) = request.birth_date {
            patch.insert("birth_date".to_string(), json!(v));
        }
        if let Some(v) = request.place_of_origin {
            patch.insert("place_of_origin".to_string(), json!(v));
        }
        if let Some(v) = request.phone {
            patch.insert("phone".to_string(), json!(v));
        }
        if let Some(v) = request.first_visit {
            patch.insert("first_visit".to_string(), json!(v));
        }

        if patch.is_empty() {
            return Err(PatientError::EmptyUpdate);
        }

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);

        self.supabase
            .update(&path, auth_token, Value::Object(patch))
            .await
            .map_err(|e| {
                if e.to_string().contains("matched no rows") {
                    PatientError::NotFound
                } else {
                    PatientError::Database(e.to_string())
                }
            })
    }

    /// Case-insensitive substring search over names, phone and code, with
    /// each hit annotated by the date of the patient's latest appointment.
    pub async fn search(
        &self,
        term: &str,
        auth_token: Option<&str>,
    ) -> Result<Vec<PatientWithLastVisit>, PatientError> {
        let pattern = format!("*{}*", term);
        let filter = format!(
            "(first_name.ilike.{p},last_name.ilike.{p},phone.ilike.{p},code.ilike.{p})",
            p = pattern
        );
        let path = format!(
            "/rest/v1/patients?or={}&select=*&order=code.asc",
            urlencoding::encode(&filter)
        );

        let patients: Vec<Patient> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        if patients.is_empty() {
            return Ok(vec![]);
        }

        let last_visits = self
            .last_appointment_dates(&patients, auth_token)
            .await?;

        debug!("Search for {:?} matched {} patients", term, patients.len());

        Ok(patients
            .into_iter()
            .map(|patient| {
                let last_appointment = last_visits.get(&patient.id).copied();
                PatientWithLastVisit {
                    patient,
                    last_appointment,
                }
            })
            .collect())
    }

    async fn last_appointment_dates(
        &self,
        patients: &[Patient],
        auth_token: Option<&str>,
    ) -> Result<HashMap<Uuid, NaiveDate>, PatientError> {
        let ids: Vec<String> = patients.iter().map(|p| p.id.to_string()).collect();
        let path = format!(
            "/rest/v1/appointments?patient_id=in.({})&select=patient_id,date&order=date.desc",
            ids.join(",")
        );

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        // Rows come newest first, so the first date per patient wins.
        let mut latest = HashMap::new();
        for row in rows {
            let patient_id = row["patient_id"]
                .as_str()
                .and_then(|s| Uuid::parse_str(s).ok());
            let date = row["date"]
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());

            if let (Some(patient_id), Some(date)) = (patient_id, date) {
                latest.entry(patient_id).or_insert(date);
            }
        }

        Ok(latest)
    }

    async fn phone_exists(
        &self,
        phone: &str,
        exclude: Option<Uuid>,
        auth_token: Option<&str>,
    ) -> Result<bool, PatientError> {
        let mut path = format!(
            "/rest/v1/patients?phone=eq.{}&select=id",
            urlencoding::encode(phone)
        );
        if let Some(id) = exclude {
            path.push_str(&format!("&id=neq.{}", id));
        }

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        Ok(!rows.is_empty())
    }
}

fn parse_code_number(code: &str) -> Option<u32> {
    code.strip_prefix('P')?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_numbers_parse() {
        assert_eq!(parse_code_number("P0001"), Some(1));
        assert_eq!(parse_code_number("P0042"), Some(42));
        assert_eq!(parse_code_number("X0042"), None);
        assert_eq!(parse_code_number("Pabc"), None);
    }

    #[test]
    fn code_sequence_survives_five_digits() {
        // Zero padding is a minimum width, not a cap.
        assert_eq!(parse_code_number("P9999"), Some(9999));
        assert_eq!(format!("P{:04}", 9999 + 1), "P10000");
        assert_eq!(parse_code_number("P10000"), Some(10000));
        assert_eq!(format!("P{:04}", 10000 + 1), "P10001");
    }
}
