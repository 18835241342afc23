//! Request classification.
//!
//! Decides, before any I/O, whether an inbound request is a mutation the
//! paper trail should track and against which schema and record.

mod matcher;

pub use matcher::{PathFamily, PathMatchers, DEFAULT_ADMIN_PATH_PATTERN, DEFAULT_API_PATH_PATTERN};

use crate::errors::PaperTrailError;
use crate::model::{ChangeKind, ContentSchema};
use crate::registry::SchemaRegistry;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// HTTP verbs the host can route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Options,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Change kind implied by a mutating verb
    pub fn change_kind(&self) -> Option<ChangeKind> {
        match self {
            HttpMethod::Post => Some(ChangeKind::Create),
            HttpMethod::Put | HttpMethod::Patch => Some(ChangeKind::Update),
            HttpMethod::Delete => Some(ChangeKind::Delete),
            HttpMethod::Get | HttpMethod::Head | HttpMethod::Options => None,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = PaperTrailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(PaperTrailError::Serialization {
                message: format!("unknown HTTP method: {}", other),
            }),
        }
    }
}

/// Default allow-set of tracked verbs
pub const DEFAULT_TRACKED_METHODS: [HttpMethod; 3] =
    [HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete];

/// Identifiers extracted from a matched path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParams {
    /// Schema uid on administrative paths, API name on public paths
    pub content_type: String,
    pub record_id: Option<String>,
}

/// A request the paper trail will audit
#[derive(Debug, Clone)]
pub struct Classification {
    pub schema: Arc<ContentSchema>,
    pub schema_id: String,
    pub record_id: Option<String>,
    pub is_admin: bool,
    pub change: ChangeKind,
}

/// Why a request is passed through untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotTrackedReason {
    MethodNotTracked,
    PathNotMatched,
    SchemaNotFound,
}

impl NotTrackedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotTrackedReason::MethodNotTracked => "method_not_tracked",
            NotTrackedReason::PathNotMatched => "path_not_matched",
            NotTrackedReason::SchemaNotFound => "schema_not_found",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Classified {
    Tracked(Classification),
    NotTracked(NotTrackedReason),
}

/// Pure method + path classifier
///
/// Patterns are compiled once; `classify` does no I/O and no allocation
/// beyond the extracted identifiers.
#[derive(Debug, Clone)]
pub struct RequestClassifier {
    methods: Vec<HttpMethod>,
    matchers: PathMatchers,
}

impl RequestClassifier {
    pub fn new(methods: Vec<HttpMethod>, matchers: PathMatchers) -> Self {
        Self { methods, matchers }
    }

    pub fn tracks(&self, method: HttpMethod) -> bool {
        self.methods.contains(&method)
    }

    pub fn classify(
        &self,
        method: HttpMethod,
        path: &str,
        registry: &dyn SchemaRegistry,
    ) -> Classified {
        if !self.tracks(method) {
            return Classified::NotTracked(NotTrackedReason::MethodNotTracked);
        }
        let change = match method.change_kind() {
            Some(change) => change,
            None => return Classified::NotTracked(NotTrackedReason::MethodNotTracked),
        };

        let (family, params) = match self.matchers.match_path(path) {
            Some(matched) => matched,
            None => return Classified::NotTracked(NotTrackedReason::PathNotMatched),
        };
        let is_admin = family == PathFamily::Admin;

        let schema = match registry.resolve_from_path(&params, is_admin) {
            Some(schema) => schema,
            None => return Classified::NotTracked(NotTrackedReason::SchemaNotFound),
        };

        Classified::Tracked(Classification {
            schema_id: schema.uid.clone(),
            schema,
            record_id: params.record_id,
            is_admin,
            change,
        })
    }
}

impl Default for RequestClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_TRACKED_METHODS.to_vec(), PathMatchers::default())
    }
}
