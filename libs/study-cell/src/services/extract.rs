//! Text extraction for uploaded studies.
//!
//! PDFs are read through their text layer; scanned images go through the
//! external `tesseract` binary. Anything else gets a fixed placeholder so
//! the study is still archived.

use std::path::Path;

use tokio::process::Command;
use tracing::{debug, warn};

pub const UNSUPPORTED_PLACEHOLDER: &str = "Unsupported file type.";
pub const NO_TEXT_PLACEHOLDER: &str = "(no text recognized)";

const OCR_LANGUAGE: &str = "spa";

pub async fn extract_text(stored_path: &Path, file_name: &str) -> String {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("pdf") => extract_pdf_text(stored_path).await,
        Some("jpg") | Some("jpeg") | Some("png") => extract_image_text(stored_path).await,
        _ => UNSUPPORTED_PLACEHOLDER.to_string(),
    }
}

async fn extract_pdf_text(stored_path: &Path) -> String {
    let path = stored_path.to_path_buf();

    let result = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path)).await;

    match result {
        Ok(Ok(text)) if !text.trim().is_empty() => text,
        Ok(Ok(_)) => {
            debug!("PDF {} has an empty text layer", stored_path.display());
            NO_TEXT_PLACEHOLDER.to_string()
        }
        Ok(Err(e)) => {
            warn!("PDF text extraction failed for {}: {}", stored_path.display(), e);
            NO_TEXT_PLACEHOLDER.to_string()
        }
        Err(e) => {
            warn!("PDF extraction task panicked: {}", e);
            NO_TEXT_PLACEHOLDER.to_string()
        }
    }
}

async fn extract_image_text(stored_path: &Path) -> String {
    let output = Command::new("tesseract")
        .arg(stored_path)
        .arg("stdout")
        .args(["-l", OCR_LANGUAGE])
        .output()
        .await;

    match output {
        Ok(out) if out.status.success() => {
            let text = String::from_utf8_lossy(&out.stdout).trim().to_string();
            if text.is_empty() {
                NO_TEXT_PLACEHOLDER.to_string()
            } else {
                text
            }
        }
        Ok(out) => {
            warn!(
                "tesseract exited with {} for {}",
                out.status,
                stored_path.display()
            );
            NO_TEXT_PLACEHOLDER.to_string()
        }
        Err(e) => {
            warn!("Could not run tesseract: {}", e);
            NO_TEXT_PLACEHOLDER.to_string()
        }
    }
}
