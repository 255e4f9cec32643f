use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Study, StudyError};
use crate::services::extract;

pub struct StudyArchiveService {
    supabase: Arc<SupabaseClient>,
    media_root: PathBuf,
}

impl StudyArchiveService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            media_root: PathBuf::from(&config.media_root),
        }
    }

    /// Stores the uploaded file under the media root, runs text extraction
    /// and records the study row.
    pub async fn store(
        &self,
        patient_id: Uuid,
        file_name: &str,
        bytes: &[u8],
        description: Option<String>,
        auth_token: Option<&str>,
    ) -> Result<Study, StudyError> {
        self.verify_patient(patient_id, auth_token).await?;

        // Client-supplied names may carry directory components.
        let safe_name = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("study")
            .to_string();

        let studies_dir = self.media_root.join("studies");
        tokio::fs::create_dir_all(&studies_dir)
            .await
            .map_err(|e| StudyError::Storage(e.to_string()))?;

        let stored_name = format!("{}_{}", Uuid::new_v4(), safe_name);
        let stored_path = studies_dir.join(&stored_name);

        tokio::fs::write(&stored_path, bytes)
            .await
            .map_err(|e| StudyError::Storage(e.to_string()))?;

        let extracted_text = extract::extract_text(&stored_path, &safe_name).await;

        let row = json!({
            "patient_id": patient_id,
            "file_name": safe_name,
            "stored_path": format!("studies/{}", stored_name),
            "description": description,
            "extracted_text": extracted_text,
        });

        let study: Study = self
            .supabase
            .insert("studies", auth_token, row)
            .await
            .map_err(|e| StudyError::Database(e.to_string()))?;

        info!("Archived study {} for patient {}", study.id, patient_id);
        Ok(study)
    }

    pub async fn list(
        &self,
        patient_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Vec<Study>, StudyError> {
        let path = format!(
            "/rest/v1/studies?patient_id=eq.{}&select=*&order=uploaded_at.desc",
            patient_id
        );

        self.supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| StudyError::Database(e.to_string()))
    }

    async fn verify_patient(
        &self,
        patient_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<(), StudyError> {
        let path = format!("/rest/v1/patients?id=eq.{}&select=id", patient_id);

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| StudyError::Database(e.to_string()))?;

        if rows.is_empty() {
            return Err(StudyError::PatientNotFound);
        }
        Ok(())
    }
}
