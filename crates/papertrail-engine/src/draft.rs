//! Draft proposals: content saved for review without mutating the record

use crate::pipeline::ChangeInterceptor;
use papertrail_core::diff::DiffEngine;
use papertrail_core::errors::{ExError, PaperTrailError};
use papertrail_core::model::{ChangeKind, TrailRecord, TrailSubmission};
use papertrail_core::{log_op_end, log_op_error, log_op_start};
use papertrail_core_types::RequestContext;
use serde_json::Value;
use std::time::Instant;

impl ChangeInterceptor {
    /// Record `content` as a DRAFT of record `record_id` of `uid`
    ///
    /// The draft is diffed against the record's current state. Drafts are
    /// always attributed to the administrative surface.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `uid` is not a registered content type
    /// - `DepthExceeded` if `content` nests deeper than the diff limit
    /// - Whatever the fetch adapter or store reports
    pub async fn save_draft(
        &self,
        context: RequestContext,
        uid: &str,
        record_id: Option<&str>,
        content: Value,
    ) -> Result<TrailRecord, ExError> {
        let start = Instant::now();
        log_op_start!(
            "save_draft",
            request_id = context.request_id.as_str(),
            content_type = uid,
            record_id = record_id.unwrap_or_default()
        );

        let result = self.save_draft_inner(context, uid, record_id, content).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(trail) => log_op_end!(
                "save_draft",
                duration_ms = duration_ms,
                trail_id = trail.id.as_str(),
                version = trail.version
            ),
            Err(err) => log_op_error!("save_draft", err.clone(), duration_ms = duration_ms),
        }
        result
    }

    async fn save_draft_inner(
        &self,
        context: RequestContext,
        uid: &str,
        record_id: Option<&str>,
        content: Value,
    ) -> Result<TrailRecord, ExError> {
        let schema = self
            .registry()
            .resolve(uid)
            .ok_or_else(|| PaperTrailError::SchemaNotFound {
                uid: uid.to_string(),
            })?;

        let previous = self.capturer().capture(record_id, uid).await?;
        let changes = DiffEngine::new(self.registry(), self.diff_options())
            .diff(&content, previous.as_ref(), &schema, "")
            .map_err(|e| ExError::from(e).with_op("save_draft").with_content_type(uid))?;

        self.store()
            .create(TrailSubmission {
                context,
                content_type: schema.uid.clone(),
                record_id: record_id.map(str::to_string),
                change: ChangeKind::Draft,
                content,
                previous_content: previous,
                changes: Some(changes),
                is_admin: true,
            })
            .await
    }
}
