//! Paper Trail Core - change detection for content records
//!
//! This crate provides the pure half of the paper trail:
//! - Request classification (method + path → schema, record, change kind)
//! - The schema registry contract and an in-memory implementation
//! - Schema-typed diffing of content trees into change sets
//! - Snapshot normalization and populate hints for prior-state capture
//! - Trail, review and error models shared by the store and the engine
//!
//! Nothing here performs I/O apart from loading a registry file.

pub mod classifier;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod registry;
pub mod snapshot;

// Logging macros resolve field names through this path
pub use papertrail_core_types;

// Re-export commonly used types
pub use classifier::{Classification, Classified, HttpMethod, NotTrackedReason, RequestClassifier};
pub use diff::{compute_diff, ChangeSet, DiffEngine, DiffOptions};
pub use errors::{ExError, ExErrorKind, PaperTrailError, Result};
pub use model::{
    Attribute, ChangeKind, ContentSchema, ContentTree, ReviewStatus, ReviewUpdate, TrailRecord,
    TrailSubmission,
};
pub use registry::{InMemorySchemaRegistry, SchemaRegistry};
pub use snapshot::{normalize_snapshot, PopulateSpec};
