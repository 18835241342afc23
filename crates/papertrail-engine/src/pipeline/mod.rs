//! Mutation interception.
//!
//! ## Isolation
//!
//! Two boundaries surround the host's handler. Classification and capture
//! run before it; post-processing (status check, audit toggle, diff,
//! persistence) runs after it. A failure or panic inside either boundary is
//! logged with `log_op_absorbed!` and discarded: the host's response is
//! returned unchanged and the handler runs exactly once.

mod downstream;
mod stages;
mod state;

pub use stages::PostStage;
pub use state::{InterceptContext, PipelineState};

use crate::capture::SnapshotCapturer;
use crate::config::PaperTrailConfig;
use crate::ports::{EntityFetch, MutationHandler, MutationRequest, MutationResponse, TrailStore};
use downstream::PendingMutation;
use futures::FutureExt;
use papertrail_core::classifier::{Classified, RequestClassifier};
use papertrail_core::diff::DiffOptions;
use papertrail_core::errors::{ExError, ExErrorKind};
use papertrail_core::model::TrailRecord;
use papertrail_core::registry::SchemaRegistry;
use papertrail_core::{log_op_absorbed, log_op_end, log_op_start};
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

/// What happened to one request
#[derive(Debug)]
pub struct Interception {
    /// The host's response, untouched
    pub response: MutationResponse,
    /// Terminal pipeline state
    pub state: PipelineState,
    /// The persisted entry, when one was written
    pub trail: Option<TrailRecord>,
}

/// Wraps the host's mutation handler and records trail entries
pub struct ChangeInterceptor {
    classifier: RequestClassifier,
    registry: Arc<dyn SchemaRegistry>,
    capturer: SnapshotCapturer,
    store: Arc<dyn TrailStore>,
    success_statuses: BTreeSet<u16>,
    diff_options: DiffOptions,
}

impl ChangeInterceptor {
    /// # Errors
    ///
    /// `InvalidConfig` or `InvalidPattern` if `config` does not validate.
    pub fn new(
        config: &PaperTrailConfig,
        registry: Arc<dyn SchemaRegistry>,
        fetch: Arc<dyn EntityFetch>,
        store: Arc<dyn TrailStore>,
    ) -> Result<Self, ExError> {
        config.validate()?;
        Ok(Self {
            classifier: config.classifier()?,
            registry,
            capturer: SnapshotCapturer::new(fetch),
            store,
            success_statuses: config.success_statuses.iter().copied().collect(),
            diff_options: config.diff.clone(),
        })
    }

    pub fn store(&self) -> &dyn TrailStore {
        self.store.as_ref()
    }

    pub fn registry(&self) -> &dyn SchemaRegistry {
        self.registry.as_ref()
    }

    pub fn capturer(&self) -> &SnapshotCapturer {
        &self.capturer
    }

    pub fn diff_options(&self) -> &DiffOptions {
        &self.diff_options
    }

    pub fn is_success(&self, status: u16) -> bool {
        self.success_statuses.contains(&status)
    }

    /// Run `request` through `downstream`, recording a trail entry if tracked
    pub async fn handle(
        &self,
        request: MutationRequest,
        downstream: &dyn MutationHandler,
    ) -> MutationResponse {
        self.intercept(request, downstream).await.response
    }

    /// As [`Self::handle`], also reporting the pipeline outcome
    pub async fn intercept(
        &self,
        request: MutationRequest,
        downstream: &dyn MutationHandler,
    ) -> Interception {
        let start = Instant::now();
        let mut ctx = InterceptContext::new(request.context.clone());

        let prepared = AssertUnwindSafe(self.prepare(&request, &mut ctx))
            .catch_unwind()
            .await;
        if let Some(err) = boundary_failure(prepared) {
            log_op_absorbed!(
                "intercept_prepare",
                err,
                request_id = ctx.request.request_id.as_str(),
                path = %request.path
            );
            ctx.pass_through();
        }

        let tracked = !ctx.state.is_terminal();
        if tracked {
            log_op_start!(
                "intercept",
                request_id = ctx.request.request_id.as_str(),
                content_type = ctx.content_type().unwrap_or_default(),
                method = request.method.as_str()
            );
        }

        let response = PendingMutation::new(request).invoke(downstream).await;

        if !tracked {
            return Interception {
                response,
                state: ctx.state,
                trail: None,
            };
        }

        ctx.advance(PipelineState::DownstreamInvoked);
        let outcome = AssertUnwindSafe(self.post_process(&mut ctx, &response))
            .catch_unwind()
            .await;
        if let Some(err) = boundary_failure(outcome) {
            log_op_absorbed!(
                "intercept_post_mutation",
                err,
                request_id = ctx.request.request_id.as_str(),
                content_type = ctx.content_type().unwrap_or_default(),
                record_id = ctx.record_id().unwrap_or_default(),
                status = response.status
            );
            ctx.trail = None;
            ctx.advance(PipelineState::Skipped);
        }

        log_op_end!(
            "intercept",
            duration_ms = start.elapsed().as_millis() as u64,
            state = ctx.state.as_str(),
            trail_id = ctx.trail.as_ref().map(|t| t.id.as_str()).unwrap_or_default()
        );

        Interception {
            response,
            state: ctx.state,
            trail: ctx.trail,
        }
    }

    async fn prepare(
        &self,
        request: &MutationRequest,
        ctx: &mut InterceptContext,
    ) -> Result<(), ExError> {
        let classification =
            match self
                .classifier
                .classify(request.method, &request.path, self.registry.as_ref())
            {
                Classified::Tracked(classification) => classification,
                Classified::NotTracked(reason) => {
                    tracing::debug!(
                        reason = reason.as_str(),
                        method = request.method.as_str(),
                        path = %request.path,
                        "request not tracked"
                    );
                    ctx.advance(PipelineState::PassThrough);
                    return Ok(());
                }
            };
        ctx.classification = Some(classification);
        ctx.advance(PipelineState::Classified);

        let classification = ctx.classification()?;
        let previous = self
            .capturer
            .capture(
                classification.record_id.as_deref(),
                &classification.schema_id,
            )
            .await?;
        let new_content = record_content(&request.body, classification.is_admin);

        ctx.previous = previous;
        ctx.new_content = new_content;
        ctx.advance(PipelineState::Captured);
        Ok(())
    }

    async fn post_process(
        &self,
        ctx: &mut InterceptContext,
        response: &MutationResponse,
    ) -> Result<(), ExError> {
        for stage in PostStage::ORDER {
            if let stages::Flow::Skip(reason) = self.run_stage(stage, ctx, response).await? {
                tracing::debug!(
                    request_id = ctx.request.request_id.as_str(),
                    stage = stage.as_str(),
                    reason,
                    "trail skipped"
                );
                ctx.advance(PipelineState::Skipped);
                return Ok(());
            }
        }
        Ok(())
    }
}

/// Record fields carried by a request body.
///
/// The public API wraps them as `{"data": {...}}`; the admin API sends them flat.
fn record_content(body: &Value, is_admin: bool) -> Value {
    match body.get("data") {
        Some(data @ Value::Object(_)) if !is_admin => data.clone(),
        _ => body.clone(),
    }
}

/// Failure (error or panic) that escaped an isolation boundary
fn boundary_failure(
    outcome: Result<Result<(), ExError>, Box<dyn Any + Send>>,
) -> Option<ExError> {
    match outcome {
        Ok(Ok(())) => None,
        Ok(Err(err)) => Some(err),
        Err(payload) => Some(
            ExError::new(ExErrorKind::Internal)
                .with_op("intercept")
                .with_message(format!("panicked: {}", panic_message(payload.as_ref()))),
        ),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_content_unwraps_public_body() {
        let wrapped = json!({"data": {"title": "Old", "views": 4}});
        assert_eq!(record_content(&wrapped, false), json!({"title": "Old", "views": 4}));
        // Admin bodies are flat; a `data` attribute there is a field.
        assert_eq!(record_content(&wrapped, true), wrapped);
        assert_eq!(
            record_content(&json!({"data": null, "title": "x"}), false),
            json!({"data": null, "title": "x"})
        );
        assert_eq!(record_content(&json!({"title": "x"}), false), json!({"title": "x"}));
    }

    #[test]
    fn test_panic_message_variants() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&"boom".to_string()), "boom");
        assert_eq!(panic_message(&42u8), "non-string panic payload");
    }

    #[test]
    fn test_boundary_failure_mapping() {
        assert!(boundary_failure(Ok(Ok(()))).is_none());

        let err = boundary_failure(Ok(Err(ExError::new(ExErrorKind::Persistence)))).unwrap();
        assert_eq!(err.kind(), ExErrorKind::Persistence);

        let panicked = boundary_failure(Err(Box::new("boom"))).unwrap();
        assert_eq!(panicked.kind(), ExErrorKind::Internal);
        assert!(panicked.message().contains("boom"));
    }
}
