//! Canonical schema constants for structured logging
//!
//! These constants keep field and event names consistent across crates.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TAG: &str = "tag";

// Audited record identifiers
pub const FIELD_CONTENT_TYPE: &str = "content_type";
pub const FIELD_RECORD_ID: &str = "record_id";
pub const FIELD_TRAIL_ID: &str = "trail_id";
pub const FIELD_CHANGE: &str = "change";
pub const FIELD_STATE: &str = "state";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
/// A failure caught by an isolation boundary and deliberately discarded
pub const EVENT_ABSORBED: &str = "absorbed";

/// Fixed diagnostic tag attached to every absorbed audit-pipeline failure
pub const DIAGNOSTIC_TAG: &str = "paper-trail";
