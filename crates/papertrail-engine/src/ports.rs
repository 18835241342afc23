//! Collaborator contracts supplied by the host

use async_trait::async_trait;
use papertrail_core::classifier::HttpMethod;
use papertrail_core::errors::ExError;
use papertrail_core::model::{ReviewUpdate, TrailRecord, TrailSubmission};
use papertrail_core::snapshot::PopulateSpec;
use papertrail_core_types::RequestContext;
use serde_json::Value;

/// An inbound request as seen by the interceptor
#[derive(Debug, Clone)]
pub struct MutationRequest {
    pub method: HttpMethod,
    /// Request path, query string allowed
    pub path: String,
    /// Parsed JSON body; the new content for CREATE and UPDATE
    pub body: Value,
    pub context: RequestContext,
}

impl MutationRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>, body: Value) -> Self {
        Self {
            method,
            path: path.into(),
            body,
            context: RequestContext::new(),
        }
    }

    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }
}

/// The host's response, passed back to the caller untouched
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResponse {
    pub status: u16,
    pub body: Value,
}

impl MutationResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

/// The host's own handling of a mutation
#[async_trait]
pub trait MutationHandler: Send + Sync {
    async fn handle(&self, request: MutationRequest) -> MutationResponse;
}

/// Read access to stored records
#[async_trait]
pub trait EntityFetch: Send + Sync {
    /// Load one record of `uid`, populated as `populate` asks
    ///
    /// `Ok(None)` when no such record exists.
    async fn find_one(
        &self,
        record_id: &str,
        uid: &str,
        populate: &PopulateSpec,
    ) -> Result<Option<Value>, ExError>;
}

/// Persistence of trail entries
#[async_trait]
pub trait TrailStore: Send + Sync {
    async fn create(&self, submission: TrailSubmission) -> Result<TrailRecord, ExError>;

    async fn get(&self, trail_id: &str) -> Result<Option<TrailRecord>, ExError>;

    /// Versions of one record, oldest first
    async fn history(
        &self,
        content_type: &str,
        record_id: Option<&str>,
    ) -> Result<Vec<TrailRecord>, ExError>;

    async fn update_review(
        &self,
        trail_id: &str,
        update: ReviewUpdate,
    ) -> Result<TrailRecord, ExError>;
}
