pub mod holding;
pub mod settings;
pub mod summary;
