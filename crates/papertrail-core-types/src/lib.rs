//! Core types shared across the paper trail crates
//!
//! - **Correlation types**: RequestId, TraceId, Actor, RequestContext
//! - **Schema constants**: Canonical log field keys, event names and the
//!   diagnostic tag used for absorbed audit failures

pub mod correlation;
pub mod schema;

pub use correlation::{Actor, ActorKind, RequestContext, RequestId, TraceId};
