pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{RecordVitalsRequest, VitalSigns, VitalsError};
pub use router::vitals_routes;
pub use services::records::VitalSignsService;
