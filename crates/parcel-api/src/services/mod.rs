//! Application services

pub mod import;
