//! Request-scoped pipeline state

use papertrail_core::classifier::Classification;
use papertrail_core::errors::{ExError, ExErrorKind};
use papertrail_core::model::{TrailRecord, TrailSubmission};
use papertrail_core_types::RequestContext;
use serde_json::Value;

/// Where a request is in the interception pipeline
///
/// `Unclassified → Classified → Captured → DownstreamInvoked → PostChecked
/// → Persisted`, leaving early to `Skipped` after the downstream call or to
/// `PassThrough` before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Unclassified,
    Classified,
    Captured,
    DownstreamInvoked,
    PostChecked,
    Persisted,
    Skipped,
    PassThrough,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Unclassified => "unclassified",
            PipelineState::Classified => "classified",
            PipelineState::Captured => "captured",
            PipelineState::DownstreamInvoked => "downstream_invoked",
            PipelineState::PostChecked => "post_checked",
            PipelineState::Persisted => "persisted",
            PipelineState::Skipped => "skipped",
            PipelineState::PassThrough => "pass_through",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Persisted | PipelineState::Skipped | PipelineState::PassThrough
        )
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the stages of one request share
pub struct InterceptContext {
    pub request: RequestContext,
    pub state: PipelineState,
    pub classification: Option<Classification>,
    /// Normalized snapshot; `None` when the record had no prior version
    pub previous: Option<Value>,
    /// Record fields from the request body, kept after the request moved downstream
    pub new_content: Value,
    pub submission: Option<TrailSubmission>,
    pub trail: Option<TrailRecord>,
}

impl InterceptContext {
    pub fn new(request: RequestContext) -> Self {
        Self {
            request,
            state: PipelineState::Unclassified,
            classification: None,
            previous: None,
            new_content: Value::Null,
            submission: None,
            trail: None,
        }
    }

    pub fn advance(&mut self, next: PipelineState) {
        tracing::debug!(
            request_id = self.request.request_id.as_str(),
            from = self.state.as_str(),
            state = next.as_str(),
            "pipeline transition"
        );
        self.state = next;
    }

    /// The request is left entirely to the host
    pub fn pass_through(&mut self) {
        self.classification = None;
        self.previous = None;
        self.advance(PipelineState::PassThrough);
    }

    /// # Errors
    ///
    /// `Internal` when called before classification.
    pub fn classification(&self) -> Result<&Classification, ExError> {
        self.classification.as_ref().ok_or_else(|| {
            ExError::new(ExErrorKind::Internal)
                .with_op("intercept")
                .with_message(format!("no classification in state {}", self.state))
        })
    }

    pub fn content_type(&self) -> Option<&str> {
        self.classification.as_ref().map(|c| c.schema_id.as_str())
    }

    pub fn record_id(&self) -> Option<&str> {
        self.classification
            .as_ref()
            .and_then(|c| c.record_id.as_deref())
    }
}
