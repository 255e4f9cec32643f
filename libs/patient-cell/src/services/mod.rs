pub mod registry;

pub use registry::PatientRegistryService;
