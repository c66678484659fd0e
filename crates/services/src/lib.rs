//! # services
//!
//! Use cases on top of the domain ports: registry seeding and the record
//! create / update / delete / list operations.

pub mod catalog;
pub mod records;

pub use catalog::CatalogService;
pub use records::RecordService;

use domains::AppError;

/// Adapter failures are logged with their full chain and surfaced as
/// `AppError::Internal`.
pub(crate) fn internal(err: anyhow::Error) -> AppError {
    tracing::error!(error = ?err, "storage operation failed");
    AppError::Internal(err.to_string())
}
