// Adapters layer: concrete implementations for the collaborators around the core.

pub mod csv_source;
pub mod local_storage;
pub mod report;
