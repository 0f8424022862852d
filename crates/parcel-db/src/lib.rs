//! Parcel Database Layer
//!
//! Persistence for imported properties: the [`PropertyStore`] seam used by the import
//! pipeline, its PostgreSQL implementation and an in-memory one for tests and local runs.

pub mod db;

pub use db::error::PersistError;
pub use db::memory::InMemoryPropertyStore;
pub use db::property::{PropertyRepository, PropertyStore};
pub use db::transaction::TransactionGuard;
