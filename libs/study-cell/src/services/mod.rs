pub mod archive;
pub mod extract;

pub use archive::StudyArchiveService;
