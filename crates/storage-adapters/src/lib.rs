//! # storage-adapters
//!
//! Concrete implementations of the `domains` ports.
//! Each backend sits behind a cargo feature so binaries compile in only what
//! they use.

#[cfg(feature = "db-sqlite")]
pub mod sqlite;

#[cfg(feature = "media-local")]
pub mod media_local;

#[cfg(feature = "db-sqlite")]
pub use sqlite::SqliteStore;

#[cfg(feature = "media-local")]
pub use media_local::LocalPhotoStore;
