//! Paper Trail Store - SQLite persistence for trail entries
//!
//! Provides:
//! - SQLite schema with a checksummed migrations framework
//! - Versioned trail rows per content record
//! - Review state updates with transition and field-path validation

pub mod db;
pub mod errors;
pub mod migrations;
pub mod trail_repo;

// Re-export key types
pub use errors::Result;
pub use trail_repo::SqliteTrailRepo;
