pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Study, StudyError};
pub use router::study_routes;
pub use services::archive::StudyArchiveService;
