use crate::diff::ChangeSet;
use crate::errors::PaperTrailError;
use chrono::{DateTime, Utc};
use papertrail_core_types::{Actor, RequestContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Kind of mutation a trail entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
    /// Proposed content saved for review without touching the record
    Draft,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Create => "CREATE",
            ChangeKind::Update => "UPDATE",
            ChangeKind::Delete => "DELETE",
            ChangeKind::Draft => "DRAFT",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeKind {
    type Err = PaperTrailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATE" => Ok(ChangeKind::Create),
            "UPDATE" => Ok(ChangeKind::Update),
            "DELETE" => Ok(ChangeKind::Delete),
            "DRAFT" => Ok(ChangeKind::Draft),
            other => Err(PaperTrailError::Serialization {
                message: format!("unknown change kind: {}", other),
            }),
        }
    }
}

/// Review state of a trail entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Approved,
    ChangesRequired,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::ChangesRequired => "changes_required",
        }
    }

    /// Approved entries are final; everything else may be revisited.
    pub fn can_transition_to(&self, next: ReviewStatus) -> bool {
        match (self, next) {
            (ReviewStatus::Approved, _) => false,
            (ReviewStatus::Pending, ReviewStatus::Pending) => false,
            (ReviewStatus::Pending, _) => true,
            (ReviewStatus::ChangesRequired, _) => true,
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = PaperTrailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReviewStatus::Pending),
            "approved" => Ok(ReviewStatus::Approved),
            "changes_required" => Ok(ReviewStatus::ChangesRequired),
            other => Err(PaperTrailError::Serialization {
                message: format!("unknown review status: {}", other),
            }),
        }
    }
}

/// Everything the trail store needs to persist a new version
#[derive(Debug, Clone)]
pub struct TrailSubmission {
    pub context: RequestContext,
    pub content_type: String,
    pub record_id: Option<String>,
    pub change: ChangeKind,
    /// New content as sent by the caller; empty object for DELETE
    pub content: Value,
    /// Normalized snapshot captured before the mutation
    pub previous_content: Option<Value>,
    /// Computed change set; `None` when no diff was computed (DELETE)
    pub changes: Option<ChangeSet>,
    pub is_admin: bool,
}

/// A persisted version of a content record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailRecord {
    pub id: String,
    pub content_type: String,
    pub record_id: Option<String>,
    pub version: u32,
    pub change: ChangeKind,
    pub content: Value,
    pub previous_content: Option<Value>,
    pub changed_fields: Option<Value>,
    /// Dotted paths of every leaf in `changed_fields`
    #[serde(default)]
    pub changed_paths: Vec<String>,
    pub status: ReviewStatus,
    pub comment: Option<String>,
    #[serde(default)]
    pub field_comments: BTreeMap<String, String>,
    pub actor: Option<Actor>,
    pub is_admin: bool,
    pub request_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrailRecord {
    /// Heading used when presenting the trail, e.g. `"Launch post (ID 12)"`
    ///
    /// `main_field` is the content type's configured display field; the name
    /// is read from the new content first and the previous content second.
    pub fn display_name(&self, main_field: Option<&str>) -> String {
        let record = self.record_id.as_deref().unwrap_or("-");
        let main_field = match main_field {
            Some(field) if field != "id" => field,
            _ => return format!("ID {}", record),
        };

        let name = [Some(&self.content), self.previous_content.as_ref()]
            .into_iter()
            .flatten()
            .filter_map(|content| content.get(main_field))
            .find_map(|value| match value {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

        match name {
            Some(name) => format!("{} (ID {})", name, record),
            None => format!("ID {}", record),
        }
    }
}

/// Reviewer-side changes to an existing trail entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewUpdate {
    pub status: Option<ReviewStatus>,
    pub comment: Option<String>,
    pub field_comments: Option<BTreeMap<String, String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(content: Value, previous: Option<Value>) -> TrailRecord {
        let now = Utc::now();
        TrailRecord {
            id: "t1".to_string(),
            content_type: "api::article.article".to_string(),
            record_id: Some("12".to_string()),
            version: 1,
            change: ChangeKind::Update,
            content,
            previous_content: previous,
            changed_fields: None,
            changed_paths: vec![],
            status: ReviewStatus::Pending,
            comment: None,
            field_comments: BTreeMap::new(),
            actor: None,
            is_admin: true,
            request_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_display_name_uses_main_field() {
        let trail = record(json!({"title": "Launch post"}), None);
        assert_eq!(trail.display_name(Some("title")), "Launch post (ID 12)");
    }

    #[test]
    fn test_display_name_falls_back_to_previous_content() {
        let trail = record(json!({}), Some(json!({"title": "Old"})));
        assert_eq!(trail.display_name(Some("title")), "Old (ID 12)");
    }

    #[test]
    fn test_display_name_for_id_main_field() {
        let trail = record(json!({"title": "x"}), None);
        assert_eq!(trail.display_name(Some("id")), "ID 12");
        assert_eq!(trail.display_name(None), "ID 12");
    }

    #[test]
    fn test_review_transitions() {
        assert!(ReviewStatus::Pending.can_transition_to(ReviewStatus::Approved));
        assert!(ReviewStatus::ChangesRequired.can_transition_to(ReviewStatus::Pending));
        assert!(!ReviewStatus::Approved.can_transition_to(ReviewStatus::ChangesRequired));
        assert!(!ReviewStatus::Pending.can_transition_to(ReviewStatus::Pending));
    }

    #[test]
    fn test_change_kind_wire_format() {
        assert_eq!(serde_json::to_value(ChangeKind::Draft).unwrap(), json!("DRAFT"));
        assert_eq!("DELETE".parse::<ChangeKind>().unwrap(), ChangeKind::Delete);
    }
}
