#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use papertrail_core::errors::{ExError, ExErrorKind};
use papertrail_core::model::{Attribute, ContentSchema, ReviewUpdate, SchemaKind, TrailRecord, TrailSubmission};
use papertrail_core::snapshot::PopulateSpec;
use papertrail_core::InMemorySchemaRegistry;
use papertrail_engine::{
    ChangeInterceptor, EntityFetch, MutationHandler, MutationRequest, MutationResponse,
    PaperTrailConfig, SqliteTrailStore, TrailStore,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ARTICLE: &str = "api::article.article";
pub const HOMEPAGE: &str = "api::homepage.homepage";

pub fn registry() -> InMemorySchemaRegistry {
    let article = ContentSchema::new(ARTICLE)
        .with_kind(SchemaKind::CollectionType)
        .with_api_names("article", "articles")
        .with_audit(true)
        .with_attribute("title", Attribute::scalar("string"))
        .with_attribute("views", Attribute::scalar("integer"))
        .with_attribute("cover", Attribute::media(false))
        .with_attribute("seo", Attribute::component("shared.seo", false))
        .with_attribute("tree", Attribute::component("nested.node", false));

    let homepage = ContentSchema::new(HOMEPAGE)
        .with_kind(SchemaKind::SingleType)
        .with_api_names("homepage", "homepages")
        .with_attribute("headline", Attribute::scalar("string"));

    InMemorySchemaRegistry::new()
        .with_content_type(article)
        .with_content_type(homepage)
        .with_component(
            ContentSchema::new("shared.seo")
                .with_attribute("metaTitle", Attribute::scalar("string")),
        )
        .with_component(
            ContentSchema::new("nested.node")
                .with_attribute("label", Attribute::scalar("string"))
                .with_attribute("child", Attribute::component("nested.node", false)),
        )
}

/// Records keyed by (uid, id)
#[derive(Default)]
pub struct FakeFetch {
    records: Mutex<HashMap<(String, String), Value>>,
    fail: bool,
}

impl FakeFetch {
    pub fn with_record(self, uid: &str, id: &str, record: Value) -> Self {
        self.records
            .lock()
            .unwrap()
            .insert((uid.to_string(), id.to_string()), record);
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl EntityFetch for FakeFetch {
    async fn find_one(
        &self,
        record_id: &str,
        uid: &str,
        _populate: &PopulateSpec,
    ) -> Result<Option<Value>, ExError> {
        if self.fail {
            return Err(ExError::new(ExErrorKind::ExternalService).with_message("fetch down"));
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(uid.to_string(), record_id.to_string()))
            .cloned())
    }
}

/// Host handler answering every request with a fixed response
pub struct FakeHost {
    response: MutationResponse,
    calls: AtomicUsize,
    seen: Mutex<Vec<MutationRequest>>,
}

impl FakeHost {
    pub fn responding(status: u16, body: Value) -> Self {
        Self {
            response: MutationResponse::new(status, body),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<MutationRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl MutationHandler for FakeHost {
    async fn handle(&self, request: MutationRequest) -> MutationResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request);
        self.response.clone()
    }
}

/// Store whose writes fail, or panic
pub struct BrokenStore {
    pub panics: bool,
}

#[async_trait]
impl TrailStore for BrokenStore {
    async fn create(&self, _submission: TrailSubmission) -> Result<TrailRecord, ExError> {
        if self.panics {
            panic!("store exploded");
        }
        Err(ExError::new(ExErrorKind::Persistence).with_message("disk full"))
    }

    async fn get(&self, _trail_id: &str) -> Result<Option<TrailRecord>, ExError> {
        Ok(None)
    }

    async fn history(
        &self,
        _content_type: &str,
        _record_id: Option<&str>,
    ) -> Result<Vec<TrailRecord>, ExError> {
        Ok(Vec::new())
    }

    async fn update_review(
        &self,
        trail_id: &str,
        _update: ReviewUpdate,
    ) -> Result<TrailRecord, ExError> {
        Err(ExError::new(ExErrorKind::NotFound).with_trail_id(trail_id))
    }
}

/// SQLite store whose first `review_failures` review updates fail
pub struct FlakyReviewStore {
    pub inner: Arc<SqliteTrailStore>,
    pub review_failures: AtomicUsize,
}

#[async_trait]
impl TrailStore for FlakyReviewStore {
    async fn create(&self, submission: TrailSubmission) -> Result<TrailRecord, ExError> {
        self.inner.create(submission).await
    }

    async fn get(&self, trail_id: &str) -> Result<Option<TrailRecord>, ExError> {
        self.inner.get(trail_id).await
    }

    async fn history(
        &self,
        content_type: &str,
        record_id: Option<&str>,
    ) -> Result<Vec<TrailRecord>, ExError> {
        self.inner.history(content_type, record_id).await
    }

    async fn update_review(
        &self,
        trail_id: &str,
        update: ReviewUpdate,
    ) -> Result<TrailRecord, ExError> {
        let failing = self
            .review_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ExError::new(ExErrorKind::Persistence).with_message("database is locked"));
        }
        self.inner.update_review(trail_id, update).await
    }
}

pub fn sqlite_store() -> (tempfile::TempDir, Arc<SqliteTrailStore>) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteTrailStore::open(dir.path().join("trails.db")).unwrap();
    (dir, Arc::new(store))
}

pub fn interceptor_with(
    config: &PaperTrailConfig,
    fetch: FakeFetch,
    store: Arc<dyn TrailStore>,
) -> ChangeInterceptor {
    ChangeInterceptor::new(config, Arc::new(registry()), Arc::new(fetch), store).unwrap()
}

pub fn interceptor(fetch: FakeFetch, store: Arc<dyn TrailStore>) -> ChangeInterceptor {
    interceptor_with(&PaperTrailConfig::default(), fetch, store)
}
