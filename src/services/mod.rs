pub mod fetch;
pub mod importer;
