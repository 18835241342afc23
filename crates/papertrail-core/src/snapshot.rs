//! Prior-state snapshots of a record.
//!
//! A snapshot is the record as stored before the mutation, populated to full
//! depth. Audit metadata is reduced to the acting user's id so the stored
//! previous content never carries user profiles.

use crate::model::ID_KEY;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Audit metadata keys reduced to `{id}` in snapshots
pub const AUDIT_USER_KEYS: [&str; 2] = ["createdBy", "updatedBy"];

/// How far the fetch adapter should populate a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulateSpec {
    /// `None` populates without a depth limit
    pub depth: Option<usize>,
    /// Include relation counts on to-many relations
    pub count_relations: bool,
}

impl PopulateSpec {
    /// Every relation, component and media at any depth, with counts
    pub fn deep_all() -> Self {
        Self {
            depth: None,
            count_relations: true,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.depth.is_none()
    }
}

impl Default for PopulateSpec {
    fn default() -> Self {
        Self::deep_all()
    }
}

/// Reduce `createdBy`/`updatedBy` to `{id}`
///
/// Each key keeps its own user's id. Keys absent from the record stay
/// absent; a null user becomes `{}`. Non-object snapshots are returned
/// unchanged.
pub fn normalize_snapshot(snapshot: Value) -> Value {
    let Value::Object(mut record) = snapshot else {
        return snapshot;
    };
    for key in AUDIT_USER_KEYS {
        if let Some(user) = record.get_mut(key) {
            *user = reduce_to_id(user);
        }
    }
    Value::Object(record)
}

fn reduce_to_id(user: &Value) -> Value {
    let mut reduced = Map::new();
    let id = match user {
        Value::Object(map) => map.get(ID_KEY).cloned(),
        Value::Null => None,
        bare => Some(bare.clone()),
    };
    if let Some(id) = id.filter(|id| !id.is_null()) {
        reduced.insert(ID_KEY.to_string(), id);
    }
    Value::Object(reduced)
}
