pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Period, ReportError};
pub use router::report_routes;
pub use services::report::ReportService;
