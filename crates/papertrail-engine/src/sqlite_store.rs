//! `TrailStore` over a single SQLite connection

use crate::ports::TrailStore;
use async_trait::async_trait;
use papertrail_core::errors::{ExError, ExErrorKind};
use papertrail_core::model::{ReviewUpdate, TrailRecord, TrailSubmission};
use papertrail_store::{db, SqliteTrailRepo};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Serializes all trail writes through one connection
///
/// rusqlite calls block, so each one runs on tokio's blocking pool while
/// holding the connection lock there rather than on an executor thread.
pub struct SqliteTrailStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTrailStore {
    /// Wrap a connection that already has migrations applied
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Open (creating if needed) and migrate the database at `path`
    ///
    /// # Errors
    ///
    /// `Persistence` if the file cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ExError> {
        Ok(Self::new(db::open_migrated(path)?))
    }

    async fn run<T, F>(&self, op: &'static str, f: F) -> Result<T, ExError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, ExError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| {
                ExError::new(ExErrorKind::Persistence)
                    .with_op(op)
                    .with_message("connection lock poisoned")
            })?;
            f(&mut guard)
        })
        .await
        .map_err(|e| {
            ExError::new(ExErrorKind::Persistence)
                .with_op(op)
                .with_message(format!("store task failed: {}", e))
        })?
    }
}

#[async_trait]
impl TrailStore for SqliteTrailStore {
    async fn create(&self, submission: TrailSubmission) -> Result<TrailRecord, ExError> {
        self.run("trail_create", move |conn| {
            SqliteTrailRepo::create(conn, &submission)
        })
        .await
    }

    async fn get(&self, trail_id: &str) -> Result<Option<TrailRecord>, ExError> {
        let trail_id = trail_id.to_string();
        self.run("trail_get", move |conn| SqliteTrailRepo::get(conn, &trail_id))
            .await
    }

    async fn history(
        &self,
        content_type: &str,
        record_id: Option<&str>,
    ) -> Result<Vec<TrailRecord>, ExError> {
        let content_type = content_type.to_string();
        let record_id = record_id.map(str::to_string);
        self.run("trail_history", move |conn| {
            SqliteTrailRepo::history(conn, &content_type, record_id.as_deref())
        })
        .await
    }

    async fn update_review(
        &self,
        trail_id: &str,
        update: ReviewUpdate,
    ) -> Result<TrailRecord, ExError> {
        let trail_id = trail_id.to_string();
        self.run("trail_update_review", move |conn| {
            SqliteTrailRepo::update_review(conn, &trail_id, &update)
        })
        .await
    }
}
