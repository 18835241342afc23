//! Prior-state capture

use crate::ports::EntityFetch;
use papertrail_core::errors::ExError;
use papertrail_core::snapshot::{normalize_snapshot, PopulateSpec};
use serde_json::Value;
use std::sync::Arc;

/// Loads a record as it stands before a mutation
pub struct SnapshotCapturer {
    fetch: Arc<dyn EntityFetch>,
    populate: PopulateSpec,
}

impl SnapshotCapturer {
    pub fn new(fetch: Arc<dyn EntityFetch>) -> Self {
        Self {
            fetch,
            populate: PopulateSpec::deep_all(),
        }
    }

    /// Current state of the record, normalized
    ///
    /// `Ok(None)` means there is no prior version: either no record id was
    /// given (a collection create) or the record does not exist.
    ///
    /// # Errors
    ///
    /// Whatever the fetch adapter reports.
    pub async fn capture(
        &self,
        record_id: Option<&str>,
        uid: &str,
    ) -> Result<Option<Value>, ExError> {
        let Some(record_id) = record_id else {
            return Ok(None);
        };
        let snapshot = self
            .fetch
            .find_one(record_id, uid, &self.populate)
            .await
            .map_err(|e| {
                e.with_op("capture")
                    .with_content_type(uid)
                    .with_record_id(record_id)
            })?;
        Ok(snapshot.map(normalize_snapshot))
    }
}
