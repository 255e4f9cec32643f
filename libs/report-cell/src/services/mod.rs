pub mod pdf;
pub mod period;
pub mod report;

pub use report::ReportService;
