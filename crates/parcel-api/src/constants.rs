//! API constants

/// Versioned prefix for every API route.
pub const API_PREFIX: &str = "/api/v0";

/// Path the OpenAPI document is served from.
pub const OPENAPI_PATH: &str = "/api/openapi.json";
