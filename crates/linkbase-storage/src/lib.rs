//! Linkbase Storage - Entity store backends
//!
//! This crate provides the persistent SQLite store and an in-memory store,
//! both implementing `linkbase_core::GraphStore`.

#![allow(clippy::result_large_err)]

pub mod error;
pub mod migration;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub mod memory;

pub use error::{StorageError, StorageResult};
pub use migration::{Migratable, SchemaVersion, CURRENT_VERSION};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

pub use memory::MemoryStore;
