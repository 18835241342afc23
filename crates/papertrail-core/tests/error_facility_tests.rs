#![allow(clippy::unwrap_used, clippy::expect_used)]

use papertrail_core::errors::{ExError, ExErrorKind, PaperTrailError};

#[test]
fn test_trail_not_found_verifiable_by_kind() {
    let err = PaperTrailError::TrailNotFound {
        trail_id: "missing".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::NotFound);
    assert_eq!(ex_err.code(), "ERR_NOT_FOUND");
    assert_eq!(ex_err.trail_id(), Some("missing"));
}

#[test]
fn test_schema_not_found_carries_content_type() {
    let ex_err: ExError = PaperTrailError::SchemaNotFound {
        uid: "api::ghost.ghost".to_string(),
    }
    .into();

    assert_eq!(ex_err.kind(), ExErrorKind::NotFound);
    assert_eq!(ex_err.content_type(), Some("api::ghost.ghost"));
}

#[test]
fn test_review_transition_distinct_from_field_path() {
    let transition: ExError = PaperTrailError::InvalidReviewTransition {
        trail_id: "t1".to_string(),
        from: "approved".to_string(),
        to: "pending".to_string(),
    }
    .into();
    let path: ExError = PaperTrailError::UnknownFieldPath {
        trail_id: "t1".to_string(),
        path: "seo.nope".to_string(),
    }
    .into();

    assert_eq!(transition.kind(), ExErrorKind::InvalidTransition);
    assert!(transition.message().contains("approved"));
    assert_eq!(path.kind(), ExErrorKind::UnknownFieldPath);
    assert_eq!(path.path(), Some("seo.nope"));
}

#[test]
fn test_serde_error_becomes_serialization() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: PaperTrailError = json_err.into();
    let ex_err: ExError = err.into();

    assert_eq!(ex_err.code(), "ERR_SERIALIZATION");
}

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (ExErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
        (ExErrorKind::InvalidSchema, "ERR_INVALID_SCHEMA"),
        (ExErrorKind::InvalidPattern, "ERR_INVALID_PATTERN"),
        (ExErrorKind::InvalidConfig, "ERR_INVALID_CONFIG"),
        (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
        (ExErrorKind::DepthExceeded, "ERR_DEPTH_EXCEEDED"),
        (ExErrorKind::InvalidTransition, "ERR_INVALID_TRANSITION"),
        (ExErrorKind::UnknownFieldPath, "ERR_UNKNOWN_FIELD_PATH"),
        (ExErrorKind::Io, "ERR_IO"),
        (ExErrorKind::Serialization, "ERR_SERIALIZATION"),
        (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
        (ExErrorKind::ExternalService, "ERR_EXTERNAL_SERVICE"),
        (ExErrorKind::Internal, "ERR_INTERNAL"),
    ];

    let mut seen = std::collections::HashSet::new();
    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
        assert!(seen.insert(expected_code), "duplicate code {}", expected_code);
    }
}

#[test]
fn test_builder_context_is_readable() {
    let err = ExError::new(ExErrorKind::ExternalService)
        .with_op("capture")
        .with_content_type("api::article.article")
        .with_record_id("12")
        .with_message("fetch timed out");

    assert_eq!(err.op(), Some("capture"));
    assert_eq!(err.record_id(), Some("12"));
    assert_eq!(err.message(), "fetch timed out");
    assert!(err.source_error().is_none());
}
