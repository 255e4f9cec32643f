pub mod records;

pub use records::VitalSignsService;
