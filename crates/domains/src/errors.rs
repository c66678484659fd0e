//! # AppError
//!
//! Centralized error handling for the Wildlog services.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all service operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Record not found (e.g., Sighting, Harvest)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Submitted animal name has no row in the animal registry
    #[error("unknown animal: {0}")]
    UnknownAnimal(String),

    /// The photo could not be stored. Callers recover from this one.
    #[error("upload failed: {0}")]
    UploadFailure(String),

    /// Validation failure (e.g., missing required field)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Infrastructure failure (e.g., database unavailable)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(kind: &str, id: i64) -> Self {
        Self::NotFound(kind.to_string(), id.to_string())
    }
}

/// A specialized Result type for Wildlog logic.
pub type Result<T> = std::result::Result<T, AppError>;
