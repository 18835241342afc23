//! Paper Trail Engine - Orchestration layer
//!
//! Wraps a host's mutation handler so that every tracked mutation leaves a
//! versioned trail entry, without ever changing the host's response:
//! - `ChangeInterceptor`: classify, capture, invoke downstream once, diff, persist
//! - Review workflow: drafts, change requests, approvals
//! - Collaborator ports (`EntityFetch`, `TrailStore`, `MutationHandler`)
//! - TOML configuration
//!
//! ## Logging Ownership
//!
//! The engine owns lifecycle logging (`log_op_start!`/`log_op_end!`) and is
//! the only layer that absorbs failures (`log_op_absorbed!`). Lower layers use
//! `tracing::debug!()` for internal details.

pub mod capture;
pub mod config;
pub mod draft;
pub mod pipeline;
pub mod ports;
pub mod review;
pub mod sqlite_store;

pub use capture::SnapshotCapturer;
pub use config::PaperTrailConfig;
pub use pipeline::{ChangeInterceptor, Interception, PipelineState};
pub use ports::{EntityFetch, MutationHandler, MutationRequest, MutationResponse, TrailStore};
pub use review::ApprovalOutcome;
pub use sqlite_store::SqliteTrailStore;
