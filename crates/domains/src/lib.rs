//! wildlog/crates/domains/src/lib.rs
//!
//! The central domain model and interface definitions for Wildlog.
//! Nothing in here performs I/O; adapters implement the traits in [`ports`].

pub mod errors;
pub mod fields;
pub mod models;
pub mod ports;
pub mod taxonomy;

// Re-exporting for easier access in other crates
pub use errors::*;
pub use fields::FieldMap;
pub use models::*;
pub use ports::*;
