pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{CreatePatientRequest, Patient, PatientError, UpdatePatientRequest};
pub use router::patient_routes;
pub use services::registry::PatientRegistryService;
