//! # API Shared
//!
//! Shared wire types and services for the HC server and CLI.
//!
//! Contains:
//! - Request/response models with OpenAPI schemas (`models` module)
//! - Shared services like `HealthService`

pub mod health;
pub mod models;

pub use health::HealthService;
pub use models::*;
