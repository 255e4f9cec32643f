pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{DoctorError, DoctorListing, DoctorProfile, UpdateDoctorRequest};
pub use router::doctor_routes;
pub use services::profile::DoctorProfileService;
