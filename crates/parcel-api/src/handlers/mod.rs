pub mod property_get;
pub mod property_import;
