//! Domain-driven configuration management for Campus
//!
//! This crate provides configuration split by functional domains,
//! with validation, defaults, and environment variable support.

pub mod domains;
pub mod error;
pub mod loader;
pub mod validation;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use validation::Validatable;

// Re-export domain configurations
pub use domains::{logging::LoggingConfig, rbac::RbacConfig, CampusConfig};
