mod analyzer;
pub mod summary;
pub mod survey;
pub mod ward_dump;
pub mod wards;

pub use analyzer::Analyzer;
