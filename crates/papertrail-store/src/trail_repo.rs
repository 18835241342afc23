//! Trail persistence
//!
//! Each accepted mutation becomes one row in `trails`. Versions count up per
//! (content type, record) starting at 1; the version is assigned inside the
//! inserting transaction so concurrent writers on one connection cannot
//! collide.

#![allow(clippy::result_large_err)]

use crate::errors::{corrupt_column, from_rusqlite, Result};
use chrono::{DateTime, SubsecRound, TimeZone, Utc};
use papertrail_core::errors::{ExError, ExErrorKind, PaperTrailError};
use papertrail_core::model::{ChangeKind, ReviewStatus, ReviewUpdate, TrailRecord, TrailSubmission};
use papertrail_core_types::Actor;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;
use std::collections::BTreeMap;

const SELECT_COLUMNS: &str = "id, content_type, record_id, version, change, content_json, \
     previous_content_json, changed_fields_json, changed_paths_json, status, comment, \
     field_comments_json, actor_json, is_admin, request_id, created_at, updated_at";

/// SQLite repository for trail entries
pub struct SqliteTrailRepo;

impl SqliteTrailRepo {
    /// Record a new version of a content record
    ///
    /// The entry starts in review status `pending`.
    pub fn create(conn: &mut Connection, submission: &TrailSubmission) -> Result<TrailRecord> {
        let tx = conn.transaction().map_err(from_rusqlite)?;

        let version: u32 = tx
            .query_row(
                "SELECT COALESCE(MAX(version), 0) + 1 FROM trails
                 WHERE content_type = ?1 AND record_id IS ?2",
                params![submission.content_type, submission.record_id],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)?;

        // Stored with millisecond precision
        let now = Utc::now().trunc_subsecs(3);
        let (changed_fields, changed_paths) = match &submission.changes {
            Some(changes) => (Some(changes.to_value()), changes.paths().to_vec()),
            None => (None, Vec::new()),
        };

        let record = TrailRecord {
            id: uuid::Uuid::now_v7().to_string(),
            content_type: submission.content_type.clone(),
            record_id: submission.record_id.clone(),
            version,
            change: submission.change,
            content: submission.content.clone(),
            previous_content: submission.previous_content.clone(),
            changed_fields,
            changed_paths,
            status: ReviewStatus::Pending,
            comment: None,
            field_comments: BTreeMap::new(),
            actor: submission.context.actor.clone(),
            is_admin: submission.is_admin,
            request_id: Some(submission.context.request_id.as_str().to_string()),
            created_at: now,
            updated_at: now,
        };

        tx.execute(
            "INSERT INTO trails (id, content_type, record_id, version, change, content_json,
                previous_content_json, changed_fields_json, changed_paths_json, status, comment,
                field_comments_json, actor_json, is_admin, request_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                record.id,
                record.content_type,
                record.record_id,
                record.version,
                record.change.as_str(),
                record.content.to_string(),
                record.previous_content.as_ref().map(Value::to_string),
                record.changed_fields.as_ref().map(Value::to_string),
                encode(&record.changed_paths)?,
                record.status.as_str(),
                record.comment,
                encode(&record.field_comments)?,
                record.actor.as_ref().map(encode).transpose()?,
                record.is_admin,
                record.request_id,
                record.created_at.timestamp_millis(),
                record.updated_at.timestamp_millis(),
            ],
        )
        .map_err(from_rusqlite)?;
        tx.commit().map_err(from_rusqlite)?;

        tracing::debug!(
            trail_id = %record.id,
            content_type = %record.content_type,
            version = record.version,
            change = record.change.as_str(),
            "trail created"
        );
        Ok(record)
    }

    pub fn get(conn: &Connection, trail_id: &str) -> Result<Option<TrailRecord>> {
        let row = conn
            .query_row(
                &format!("SELECT {} FROM trails WHERE id = ?1", SELECT_COLUMNS),
                [trail_id],
                TrailRow::from_row,
            )
            .optional()
            .map_err(from_rusqlite)?;
        row.map(TrailRow::into_record).transpose()
    }

    /// All versions of one record, oldest first
    pub fn history(
        conn: &Connection,
        content_type: &str,
        record_id: Option<&str>,
    ) -> Result<Vec<TrailRecord>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM trails WHERE content_type = ?1 AND record_id IS ?2
                 ORDER BY version",
                SELECT_COLUMNS
            ))
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map(params![content_type, record_id], TrailRow::from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        rows.into_iter().map(TrailRow::into_record).collect()
    }

    /// Entries awaiting a reviewer, oldest first
    pub fn list_by_status(conn: &Connection, status: ReviewStatus) -> Result<Vec<TrailRecord>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM trails WHERE status = ?1 ORDER BY created_at, version",
                SELECT_COLUMNS
            ))
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([status.as_str()], TrailRow::from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        rows.into_iter().map(TrailRow::into_record).collect()
    }

    /// Apply a reviewer's decision
    ///
    /// Status changes must follow [`ReviewStatus::can_transition_to`]. Field
    /// comment keys must name a changed path of the entry, or a prefix of
    /// one (`seo` covers `seo.metaTitle`).
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidTransition` or `UnknownFieldPath`; nothing is
    /// written on error.
    pub fn update_review(
        conn: &mut Connection,
        trail_id: &str,
        update: &ReviewUpdate,
    ) -> Result<TrailRecord> {
        let tx = conn.transaction().map_err(from_rusqlite)?;

        let current = tx
            .query_row(
                &format!("SELECT {} FROM trails WHERE id = ?1", SELECT_COLUMNS),
                [trail_id],
                TrailRow::from_row,
            )
            .optional()
            .map_err(from_rusqlite)?
            .ok_or_else(|| {
                ExError::from(PaperTrailError::TrailNotFound {
                    trail_id: trail_id.to_string(),
                })
                .with_op("trail_update_review")
            })?
            .into_record()?;

        if let Some(next) = update.status {
            if !current.status.can_transition_to(next) {
                return Err(ExError::from(PaperTrailError::InvalidReviewTransition {
                    trail_id: trail_id.to_string(),
                    from: current.status.to_string(),
                    to: next.to_string(),
                })
                .with_op("trail_update_review"));
            }
        }

        if let Some(comments) = &update.field_comments {
            if let Some(path) = comments
                .keys()
                .find(|path| !covers_changed_path(&current.changed_paths, path))
            {
                return Err(ExError::from(PaperTrailError::UnknownFieldPath {
                    trail_id: trail_id.to_string(),
                    path: path.clone(),
                })
                .with_op("trail_update_review"));
            }
        }

        let status = update.status.unwrap_or(current.status);
        let comment = update.comment.clone().or(current.comment);
        let field_comments = update
            .field_comments
            .clone()
            .unwrap_or(current.field_comments);
        let updated_at = Utc::now().trunc_subsecs(3);

        tx.execute(
            "UPDATE trails SET status = ?1, comment = ?2, field_comments_json = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                status.as_str(),
                comment,
                encode(&field_comments)?,
                updated_at.timestamp_millis(),
                trail_id,
            ],
        )
        .map_err(from_rusqlite)?;
        tx.commit().map_err(from_rusqlite)?;

        tracing::debug!(trail_id, status = status.as_str(), "trail review updated");

        Ok(TrailRecord {
            status,
            comment,
            field_comments,
            updated_at,
            ..current
        })
    }
}

fn covers_changed_path(changed: &[String], path: &str) -> bool {
    changed.iter().any(|changed| {
        changed == path
            || changed
                .strip_prefix(path)
                .is_some_and(|rest| rest.starts_with('.'))
    })
}

fn encode<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("trail_encode")
            .with_message(e.to_string())
    })
}

/// Raw column values, decoded into a [`TrailRecord`] outside the row callback
struct TrailRow {
    id: String,
    content_type: String,
    record_id: Option<String>,
    version: u32,
    change: String,
    content_json: String,
    previous_content_json: Option<String>,
    changed_fields_json: Option<String>,
    changed_paths_json: String,
    status: String,
    comment: Option<String>,
    field_comments_json: String,
    actor_json: Option<String>,
    is_admin: bool,
    request_id: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TrailRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            content_type: row.get(1)?,
            record_id: row.get(2)?,
            version: row.get(3)?,
            change: row.get(4)?,
            content_json: row.get(5)?,
            previous_content_json: row.get(6)?,
            changed_fields_json: row.get(7)?,
            changed_paths_json: row.get(8)?,
            status: row.get(9)?,
            comment: row.get(10)?,
            field_comments_json: row.get(11)?,
            actor_json: row.get(12)?,
            is_admin: row.get(13)?,
            request_id: row.get(14)?,
            created_at: row.get(15)?,
            updated_at: row.get(16)?,
        })
    }

    fn into_record(self) -> Result<TrailRecord> {
        TrailRecord::try_from(self)
    }
}

impl TryFrom<TrailRow> for TrailRecord {
    type Error = ExError;

    fn try_from(row: TrailRow) -> Result<Self> {
        let id = row.id;
        let json = |column: &str, text: &str| -> Result<Value> {
            serde_json::from_str(text).map_err(|e| corrupt_column(column, &id, e))
        };

        let content = json("content_json", &row.content_json)?;
        let previous_content = row
            .previous_content_json
            .as_deref()
            .map(|text| json("previous_content_json", text))
            .transpose()?;
        let changed_fields = row
            .changed_fields_json
            .as_deref()
            .map(|text| json("changed_fields_json", text))
            .transpose()?;
        let changed_paths: Vec<String> = serde_json::from_str(&row.changed_paths_json)
            .map_err(|e| corrupt_column("changed_paths_json", &id, e))?;
        let field_comments: BTreeMap<String, String> =
            serde_json::from_str(&row.field_comments_json)
                .map_err(|e| corrupt_column("field_comments_json", &id, e))?;
        let actor: Option<Actor> = row
            .actor_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| corrupt_column("actor_json", &id, e))?;

        let change: ChangeKind = row
            .change
            .parse()
            .map_err(|e| corrupt_column("change", &id, e))?;
        let status: ReviewStatus = row
            .status
            .parse()
            .map_err(|e| corrupt_column("status", &id, e))?;

        Ok(TrailRecord {
            content_type: row.content_type,
            record_id: row.record_id,
            version: row.version,
            change,
            content,
            previous_content,
            changed_fields,
            changed_paths,
            status,
            comment: row.comment,
            field_comments,
            actor,
            is_admin: row.is_admin,
            request_id: row.request_id,
            created_at: from_millis("created_at", &id, row.created_at)?,
            updated_at: from_millis("updated_at", &id, row.updated_at)?,
            id,
        })
    }
}

fn from_millis(column: &str, trail_id: &str, millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| corrupt_column(column, trail_id, format!("timestamp {}", millis)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covers_changed_path() {
        let changed = vec!["seo.metaTitle".to_string(), "blocks.0.body".to_string()];

        assert!(covers_changed_path(&changed, "seo.metaTitle"));
        assert!(covers_changed_path(&changed, "seo"));
        assert!(covers_changed_path(&changed, "blocks.0"));
        assert!(!covers_changed_path(&changed, "se"));
        assert!(!covers_changed_path(&changed, "title"));
    }
}
