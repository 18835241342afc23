//! Canonical logging macros

/// Log the start of an operation
///
/// ```
/// # use papertrail_core::log_op_start;
/// log_op_start!("intercept");
/// log_op_start!("intercept", content_type = "api::article.article");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::papertrail_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::papertrail_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use papertrail_core::log_op_end;
/// log_op_end!("intercept", duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::papertrail_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::papertrail_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error that is returned to the caller
///
/// ```ignore
/// # use papertrail_core::{log_op_error, errors::PaperTrailError};
/// let err = PaperTrailError::TrailNotFound { trail_id: "t1".to_string() };
/// log_op_error!("trail_approve", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        use $crate::errors::ExError;
        let ex_err: ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::papertrail_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        use $crate::errors::ExError;
        let ex_err: ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::papertrail_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            $($field)*
        );
    }};
}

/// Log a failure that an isolation boundary caught and discarded
///
/// Always carries the fixed `paper-trail` diagnostic tag.
///
/// ```ignore
/// # use papertrail_core::{log_op_absorbed, errors::{ExError, ExErrorKind}};
/// let err = ExError::new(ExErrorKind::Persistence);
/// log_op_absorbed!("post_mutation", err);
/// ```
#[macro_export]
macro_rules! log_op_absorbed {
    ($op:expr, $err:expr) => {{
        use $crate::errors::ExError;
        let ex_err: ExError = $err.into();
        tracing::warn!(
            component = module_path!(),
            op = $op,
            event = $crate::papertrail_core_types::schema::EVENT_ABSORBED,
            tag = $crate::papertrail_core_types::schema::DIAGNOSTIC_TAG,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err = %ex_err,
        );
    }};
    ($op:expr, $err:expr, $($field:tt)*) => {{
        use $crate::errors::ExError;
        let ex_err: ExError = $err.into();
        tracing::warn!(
            component = module_path!(),
            op = $op,
            event = $crate::papertrail_core_types::schema::EVENT_ABSORBED,
            tag = $crate::papertrail_core_types::schema::DIAGNOSTIC_TAG,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err = %ex_err,
            $($field)*
        );
    }};
}
