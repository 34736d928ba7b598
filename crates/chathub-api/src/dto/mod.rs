//! Data transfer objects for HTTP responses.

pub mod response;

pub use response::{ApiResponse, DetailedHealthResponse, HealthResponse};
