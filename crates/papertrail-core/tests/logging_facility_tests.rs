#![allow(clippy::unwrap_used, clippy::expect_used)]

use papertrail_core::errors::{ExError, ExErrorKind, PaperTrailError};
use papertrail_core::logging_facility::test_capture::init_test_capture;
use papertrail_core::{log_op_absorbed, log_op_end, log_op_error, log_op_start};
use papertrail_core_types::schema::{
    DIAGNOSTIC_TAG, EVENT_ABSORBED, EVENT_END, EVENT_END_ERROR, EVENT_START,
};
use tracing::Level;

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, content_type = "api::article.article");

    let events = capture.events_for(op_name, EVENT_START);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].field("content_type"), Some("api::article.article"));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let events = capture.events_for(op_name, EVENT_END);
    assert_eq!(events.len(), 1, "Should have exactly one end event");
    assert_eq!(events[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = PaperTrailError::TrailNotFound {
        trail_id: "t1".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let events = capture.events_for(op_name, EVENT_END_ERROR);
    assert_eq!(events.len(), 1, "Should have exactly one error event");
    assert_eq!(events[0].level, Level::ERROR);
    assert_eq!(events[0].field("err.code"), Some("ERR_NOT_FOUND"));
}

#[test]
fn test_log_op_absorbed_is_tagged_warning() {
    let capture = init_test_capture();
    let op_name = "test_log_op_absorbed_unique_4";

    let err = ExError::new(ExErrorKind::Persistence).with_message("disk full");
    log_op_absorbed!(op_name, err, record_id = "12");

    let events = capture.events_for(op_name, EVENT_ABSORBED);
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.level, Level::WARN);
    assert_eq!(event.field("tag"), Some(DIAGNOSTIC_TAG));
    assert_eq!(event.field("err.code"), Some("ERR_PERSISTENCE"));
    assert_eq!(event.field("record_id"), Some("12"));
    assert!(event.field("err").unwrap().contains("disk full"));
}

#[test]
fn test_boundary_ownership_single_start_end() {
    let capture = init_test_capture();
    let op_name = "test_boundary_ownership_unique_5";

    log_op_start!(op_name, trail_id = "t1");
    log_op_end!(op_name, duration_ms = 7);

    let count = capture.count_events(|e| e.op.as_deref() == Some(op_name));
    assert_eq!(count, 2, "Exactly one start and one end per operation");
    capture.assert_event_exists(op_name, EVENT_START);
    capture.assert_event_exists(op_name, EVENT_END);
}
