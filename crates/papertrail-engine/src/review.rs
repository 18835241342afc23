//! Reviewer actions on trail entries
//!
//! Status rules live in the store (`update_review`); this layer adds the
//! one side effect a review can have: approving a DRAFT applies its content
//! to the record through the intercepted mutation path, which itself leaves
//! an UPDATE entry.
//!
//! Applying the draft and marking it approved are two writes. If the second
//! fails the draft stays pending with its UPDATE already recorded; a retried
//! approval finds that UPDATE and does not send the draft to the host again.

use crate::pipeline::ChangeInterceptor;
use crate::ports::{MutationHandler, MutationRequest};
use papertrail_core::classifier::HttpMethod;
use papertrail_core::errors::{ExError, ExErrorKind, PaperTrailError};
use papertrail_core::model::{
    ChangeKind, ContentSchema, ReviewStatus, ReviewUpdate, SchemaKind, TrailRecord,
};
use papertrail_core::{log_op_end, log_op_error, log_op_start};
use papertrail_core_types::RequestContext;
use std::collections::BTreeMap;
use std::time::Instant;

/// Result of approving a trail entry
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    /// The approved entry
    pub trail: TrailRecord,
    /// UPDATE entry recorded when an approved DRAFT was applied
    pub applied: Option<TrailRecord>,
}

impl ChangeInterceptor {
    /// Approve a trail entry
    ///
    /// # Errors
    ///
    /// - `NotFound` if the trail does not exist
    /// - `InvalidTransition` if it is already approved
    /// - `ExternalService` if applying a DRAFT was rejected by the host
    pub async fn approve(
        &self,
        trail_id: &str,
        reviewer: RequestContext,
        downstream: &dyn MutationHandler,
    ) -> Result<ApprovalOutcome, ExError> {
        let start = Instant::now();
        log_op_start!(
            "trail_approve",
            trail_id = trail_id,
            request_id = reviewer.request_id.as_str()
        );

        let result = self.approve_inner(trail_id, reviewer, downstream).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(outcome) => log_op_end!(
                "trail_approve",
                duration_ms = duration_ms,
                trail_id = trail_id,
                applied = outcome.applied.is_some()
            ),
            Err(err) => log_op_error!("trail_approve", err.clone(), duration_ms = duration_ms),
        }
        result
    }

    async fn approve_inner(
        &self,
        trail_id: &str,
        reviewer: RequestContext,
        downstream: &dyn MutationHandler,
    ) -> Result<ApprovalOutcome, ExError> {
        let trail = self.load_trail(trail_id).await?;
        if !trail.status.can_transition_to(ReviewStatus::Approved) {
            return Err(PaperTrailError::InvalidReviewTransition {
                trail_id: trail_id.to_string(),
                from: trail.status.to_string(),
                to: ReviewStatus::Approved.to_string(),
            }
            .into());
        }

        let applied = if trail.change == ChangeKind::Draft {
            self.apply_draft(&trail, reviewer, downstream).await?
        } else {
            None
        };

        let trail = self
            .store()
            .update_review(
                trail_id,
                ReviewUpdate {
                    status: Some(ReviewStatus::Approved),
                    ..Default::default()
                },
            )
            .await?;
        Ok(ApprovalOutcome { trail, applied })
    }

    async fn apply_draft(
        &self,
        draft: &TrailRecord,
        reviewer: RequestContext,
        downstream: &dyn MutationHandler,
    ) -> Result<Option<TrailRecord>, ExError> {
        if let Some(applied) = self.applied_update(draft).await? {
            tracing::debug!(
                trail_id = draft.id.as_str(),
                applied_id = applied.id.as_str(),
                "draft already applied"
            );
            return Ok(Some(applied));
        }

        let schema = self
            .registry()
            .resolve(&draft.content_type)
            .ok_or_else(|| PaperTrailError::SchemaNotFound {
                uid: draft.content_type.clone(),
            })?;

        let path = admin_record_path(&schema, draft.record_id.as_deref());
        let request =
            MutationRequest::new(HttpMethod::Put, path, draft.content.clone()).with_context(reviewer);
        let interception = self.intercept(request, downstream).await;

        if !self.is_success(interception.response.status) {
            return Err(ExError::new(ExErrorKind::ExternalService)
                .with_op("apply_draft")
                .with_trail_id(&draft.id)
                .with_content_type(&draft.content_type)
                .with_message(format!(
                    "host rejected draft with status {}",
                    interception.response.status
                )));
        }
        Ok(interception.trail)
    }

    /// UPDATE recorded after `draft` that carries exactly its content
    async fn applied_update(&self, draft: &TrailRecord) -> Result<Option<TrailRecord>, ExError> {
        let history = self
            .store()
            .history(&draft.content_type, draft.record_id.as_deref())
            .await?;
        Ok(history.into_iter().find(|trail| {
            trail.version > draft.version
                && trail.change == ChangeKind::Update
                && trail.content == draft.content
        }))
    }

    /// Send a trail entry back with comments
    ///
    /// `field_comments` keys are dotted paths of the entry's change set.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidTransition` or `UnknownFieldPath` from the store.
    pub async fn request_changes(
        &self,
        trail_id: &str,
        comment: Option<String>,
        field_comments: BTreeMap<String, String>,
    ) -> Result<TrailRecord, ExError> {
        let update = ReviewUpdate {
            status: Some(ReviewStatus::ChangesRequired),
            comment,
            field_comments: Some(field_comments),
        };
        self.review("trail_request_changes", trail_id, update).await
    }

    /// Replace the general comment without touching the status
    ///
    /// # Errors
    ///
    /// `NotFound` if the trail does not exist.
    pub async fn comment(&self, trail_id: &str, comment: String) -> Result<TrailRecord, ExError> {
        let update = ReviewUpdate {
            comment: Some(comment),
            ..Default::default()
        };
        self.review("trail_comment", trail_id, update).await
    }

    async fn review(
        &self,
        op: &'static str,
        trail_id: &str,
        update: ReviewUpdate,
    ) -> Result<TrailRecord, ExError> {
        let start = Instant::now();
        log_op_start!(op, trail_id = trail_id);

        let result = self.store().update_review(trail_id, update).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(trail) => log_op_end!(
                op,
                duration_ms = duration_ms,
                trail_id = trail_id,
                status = trail.status.as_str()
            ),
            Err(err) => log_op_error!(op, err.clone(), duration_ms = duration_ms),
        }
        result
    }

    async fn load_trail(&self, trail_id: &str) -> Result<TrailRecord, ExError> {
        self.store().get(trail_id).await?.ok_or_else(|| {
            PaperTrailError::TrailNotFound {
                trail_id: trail_id.to_string(),
            }
            .into()
        })
    }
}

/// `/content-manager/{segment}/{uid}[/{id}]`; single types have no id segment
fn admin_record_path(schema: &ContentSchema, record_id: Option<&str>) -> String {
    let segment = schema
        .kind
        .unwrap_or(SchemaKind::CollectionType)
        .admin_segment();
    match record_id {
        Some(id) if !schema.is_single_type() => {
            format!("/content-manager/{}/{}/{}", segment, schema.uid, id)
        }
        _ => format!("/content-manager/{}/{}", segment, schema.uid),
    }
}
