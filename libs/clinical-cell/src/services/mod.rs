pub mod notes;

pub use notes::ClinicalNotesService;
