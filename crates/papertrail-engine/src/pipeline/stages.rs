//! Post-mutation stages, run in order after the downstream call

use super::{ChangeInterceptor, InterceptContext, PipelineState};
use crate::ports::MutationResponse;
use papertrail_core::diff::DiffEngine;
use papertrail_core::errors::ExError;
use papertrail_core::model::{ChangeKind, TrailSubmission, ID_KEY};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStage {
    CheckStatus,
    CheckAuditToggle,
    ComputeChanges,
    Persist,
}

impl PostStage {
    pub const ORDER: [PostStage; 4] = [
        PostStage::CheckStatus,
        PostStage::CheckAuditToggle,
        PostStage::ComputeChanges,
        PostStage::Persist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostStage::CheckStatus => "check_status",
            PostStage::CheckAuditToggle => "check_audit_toggle",
            PostStage::ComputeChanges => "compute_changes",
            PostStage::Persist => "persist",
        }
    }
}

pub(super) enum Flow {
    Continue,
    Skip(&'static str),
}

impl ChangeInterceptor {
    pub(super) async fn run_stage(
        &self,
        stage: PostStage,
        ctx: &mut InterceptContext,
        response: &MutationResponse,
    ) -> Result<Flow, ExError> {
        match stage {
            PostStage::CheckStatus => {
                if !self.is_success(response.status) {
                    return Ok(Flow::Skip("unsuccessful_status"));
                }
                ctx.advance(PipelineState::PostChecked);
                Ok(Flow::Continue)
            }
            PostStage::CheckAuditToggle => {
                if !ctx.classification()?.schema.audit_enabled() {
                    return Ok(Flow::Skip("audit_disabled"));
                }
                Ok(Flow::Continue)
            }
            PostStage::ComputeChanges => {
                ctx.submission = Some(self.build_submission(ctx, response)?);
                Ok(Flow::Continue)
            }
            PostStage::Persist => {
                let Some(submission) = ctx.submission.take() else {
                    return Ok(Flow::Skip("nothing_to_persist"));
                };
                let trail = self.store.create(submission).await?;
                tracing::debug!(
                    trail_id = trail.id.as_str(),
                    version = trail.version,
                    change = trail.change.as_str(),
                    "trail persisted"
                );
                ctx.trail = Some(trail);
                ctx.advance(PipelineState::Persisted);
                Ok(Flow::Continue)
            }
        }
    }

    fn build_submission(
        &self,
        ctx: &InterceptContext,
        response: &MutationResponse,
    ) -> Result<TrailSubmission, ExError> {
        let classification = ctx.classification()?;
        let record_id = resolve_record_id(classification.record_id.as_deref(), &response.body);

        let (content, changes) = match classification.change {
            // A delete carries no new content to compare.
            ChangeKind::Delete => (Value::Object(Default::default()), None),
            _ => {
                let engine = DiffEngine::new(self.registry.as_ref(), &self.diff_options);
                let changes = engine
                    .diff(
                        &ctx.new_content,
                        ctx.previous.as_ref(),
                        &classification.schema,
                        "",
                    )
                    .map_err(|e| {
                        ExError::from(e)
                            .with_op("compute_changes")
                            .with_content_type(&classification.schema_id)
                    })?;
                (ctx.new_content.clone(), Some(changes))
            }
        };

        Ok(TrailSubmission {
            context: ctx.request.clone(),
            content_type: classification.schema_id.clone(),
            record_id,
            change: classification.change,
            content,
            previous_content: ctx.previous.clone(),
            changes,
            is_admin: classification.is_admin,
        })
    }
}

/// Record id from the path, else from the created record in the response
fn resolve_record_id(from_path: Option<&str>, body: &Value) -> Option<String> {
    if let Some(id) = from_path {
        return Some(id.to_string());
    }
    [body.get(ID_KEY), body.get("data").and_then(|d| d.get(ID_KEY))]
        .into_iter()
        .flatten()
        .find_map(|id| match id {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}
