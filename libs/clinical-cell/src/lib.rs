pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{ClinicalError, DiagnosisEntry, Prescription};
pub use router::clinical_routes;
pub use services::notes::ClinicalNotesService;
