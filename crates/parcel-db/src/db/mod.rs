//! Database repositories
//
// Persistence errors and their classification
pub mod error;
//
// In-memory store
pub mod memory;
//
// Property repository (PostgreSQL)
pub mod property;
//
// Transaction utilities
pub mod transaction;
