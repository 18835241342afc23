//! Schema-typed diff between a record's new content and its prior snapshot.
//!
//! Every key of the new tree is visited once and dispatched on the attribute
//! type declared by the schema. Keys the schema does not declare, and whole
//! sub-trees whose component schema is unknown, fall back to deep equality.
//!
//! Repeatable components and dynamic zones are aligned by index, not by
//! identity: inserting an item in the middle of a list reports every
//! following item as changed.

use crate::diff::change_set::ChangeSet;
use crate::errors::{PaperTrailError, Result};
use crate::model::content::{component_tag, is_empty_branch, media_id, media_ids};
use crate::model::{Attribute, ContentSchema, COMPONENT_TAG, ID_KEY};
use crate::registry::SchemaRegistry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Host bookkeeping keys never treated as business data
pub const DEFAULT_EXCLUDED_KEYS: [&str; 7] = [
    ID_KEY,
    "__temp_key__",
    "publishedAt",
    "createdAt",
    "updatedAt",
    "createdBy",
    "updatedBy",
];

/// Tunables for [`DiffEngine`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Deepest component nesting walked before giving up
    pub max_depth: usize,
    /// Keys skipped at every level; `id` is skipped regardless
    pub excluded_keys: BTreeSet<String>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            excluded_keys: DEFAULT_EXCLUDED_KEYS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

/// Computes [`ChangeSet`]s; holds no state beyond its borrowed inputs
pub struct DiffEngine<'a> {
    registry: &'a dyn SchemaRegistry,
    options: &'a DiffOptions,
}

impl<'a> DiffEngine<'a> {
    pub fn new(registry: &'a dyn SchemaRegistry, options: &'a DiffOptions) -> Self {
        Self { registry, options }
    }

    /// Diff `new` against `previous` under `schema`
    ///
    /// An absent `previous` means the record had no prior version, so every
    /// non-null value of `new` counts as changed. `path_prefix` is prepended
    /// to the reported leaf paths.
    ///
    /// # Errors
    ///
    /// `DepthExceeded` when component nesting is deeper than `max_depth`.
    pub fn diff(
        &self,
        new: &Value,
        previous: Option<&Value>,
        schema: &ContentSchema,
        path_prefix: &str,
    ) -> Result<ChangeSet> {
        let mut paths = Vec::new();
        let fields = match new.as_object() {
            Some(new) => self.diff_tree(
                new,
                previous.and_then(Value::as_object),
                Some(schema),
                path_prefix,
                0,
                &mut paths,
            )?,
            None => Map::new(),
        };
        Ok(ChangeSet::new(fields, paths))
    }

    fn is_excluded(&self, key: &str) -> bool {
        key == ID_KEY || self.options.excluded_keys.contains(key)
    }

    fn diff_tree(
        &self,
        new: &Map<String, Value>,
        previous: Option<&Map<String, Value>>,
        schema: Option<&ContentSchema>,
        prefix: &str,
        depth: usize,
        paths: &mut Vec<String>,
    ) -> Result<Map<String, Value>> {
        if depth > self.options.max_depth {
            return Err(PaperTrailError::DepthExceeded {
                path: if prefix.is_empty() {
                    "<root>".to_string()
                } else {
                    prefix.to_string()
                },
                max_depth: self.options.max_depth,
            });
        }

        let mut out = Map::new();
        for (key, new_value) in new {
            if self.is_excluded(key) {
                continue;
            }
            let path = join_path(prefix, key);
            let old_value = previous.and_then(|p| p.get(key));

            let (changed, is_leaf) = match schema.and_then(|s| s.attribute(key)) {
                None | Some(Attribute::Scalar { .. }) => (diff_scalar(new_value, old_value), true),
                Some(Attribute::Media { multiple: false }) => {
                    (diff_single_media(new_value, old_value), true)
                }
                Some(Attribute::Media { multiple: true }) => {
                    (diff_multiple_media(new_value, old_value), true)
                }
                Some(Attribute::Relation { .. }) => (diff_relation(new_value), true),
                Some(Attribute::Component {
                    component,
                    repeatable: false,
                }) => (
                    self.diff_component(component, new_value, old_value, &path, depth, paths)?,
                    false,
                ),
                Some(Attribute::Component {
                    component,
                    repeatable: true,
                }) => (
                    self.diff_repeatable(component, new_value, old_value, &path, depth, paths)?,
                    false,
                ),
                Some(Attribute::DynamicZone { .. }) => (
                    self.diff_dynamic_zone(new_value, old_value, &path, depth, paths)?,
                    false,
                ),
            };

            match changed {
                Some(value) if !is_empty_branch(&value) => {
                    if is_leaf {
                        paths.push(path);
                    }
                    out.insert(key.clone(), value);
                }
                _ => {}
            }
        }
        Ok(out)
    }

    fn diff_component(
        &self,
        component: &str,
        new: &Value,
        old: Option<&Value>,
        path: &str,
        depth: usize,
        paths: &mut Vec<String>,
    ) -> Result<Option<Value>> {
        let Some(new) = new.as_object() else {
            return Ok(None);
        };
        let schema = self.registry.component(component);
        let result = self.diff_tree(
            new,
            old.and_then(Value::as_object),
            schema.as_deref(),
            path,
            depth + 1,
            paths,
        )?;
        Ok((!result.is_empty()).then_some(Value::Object(result)))
    }

    fn diff_repeatable(
        &self,
        component: &str,
        new: &Value,
        old: Option<&Value>,
        path: &str,
        depth: usize,
        paths: &mut Vec<String>,
    ) -> Result<Option<Value>> {
        let Some(items) = new.as_array() else {
            return Ok(None);
        };
        let old_items = old.and_then(Value::as_array);
        let schema = self.registry.component(component);

        let mut results = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let result = match item.as_object() {
                Some(item) => self.diff_tree(
                    item,
                    positional(old_items, index),
                    schema.as_deref(),
                    &join_path(path, &index.to_string()),
                    depth + 1,
                    paths,
                )?,
                None => Map::new(),
            };
            results.push(result);
        }

        if results.iter().all(Map::is_empty) {
            return Ok(None);
        }
        Ok(Some(Value::Array(
            results.into_iter().map(Value::Object).collect(),
        )))
    }

    fn diff_dynamic_zone(
        &self,
        new: &Value,
        old: Option<&Value>,
        path: &str,
        depth: usize,
        paths: &mut Vec<String>,
    ) -> Result<Option<Value>> {
        let Some(items) = new.as_array() else {
            return Ok(None);
        };
        let old_items = old.and_then(Value::as_array);

        let mut any_changed = false;
        let mut results = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            // The new item's tag picks the schema even if the old item at
            // this index was a different component.
            let tag = component_tag(item);
            let schema = tag.and_then(|uid| self.registry.component(uid));

            let mut result = match item.as_object() {
                Some(item) => self.diff_tree(
                    item,
                    positional(old_items, index),
                    schema.as_deref(),
                    &join_path(path, &index.to_string()),
                    depth + 1,
                    paths,
                )?,
                None => Map::new(),
            };
            any_changed |= !result.is_empty();

            if let Some(tag) = tag {
                result.insert(COMPONENT_TAG.to_string(), Value::String(tag.to_string()));
            }
            results.push(Value::Object(result));
        }

        Ok(any_changed.then_some(Value::Array(results)))
    }
}

/// Diff with default options
///
/// # Errors
///
/// As [`DiffEngine::diff`].
pub fn compute_diff(
    new: &Value,
    previous: Option<&Value>,
    schema: &ContentSchema,
    registry: &dyn SchemaRegistry,
) -> Result<ChangeSet> {
    let options = DiffOptions::default();
    DiffEngine::new(registry, &options).diff(new, previous, schema, "")
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn positional(items: Option<&Vec<Value>>, index: usize) -> Option<&Map<String, Value>> {
    items
        .and_then(|items| items.get(index))
        .and_then(Value::as_object)
}

fn diff_scalar(new: &Value, old: Option<&Value>) -> Option<Value> {
    let old = old.unwrap_or(&Value::Null);
    (!values_equal(new, old)).then(|| new.clone())
}

/// Unchanged when both sides reference the same media id, whatever the
/// other media metadata says.
fn diff_single_media(new: &Value, old: Option<&Value>) -> Option<Value> {
    let old_id = old.and_then(media_id);
    let new_id = media_id(new);
    (!optional_values_equal(new_id, old_id)).then(|| new.clone())
}

/// Order matters: a reordered gallery is a change.
fn diff_multiple_media(new: &Value, old: Option<&Value>) -> Option<Value> {
    let new_ids = media_ids(new);
    let old_ids = old.and_then(media_ids);
    let equal = match (&new_ids, &old_ids) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .zip(b)
                    .all(|(x, y)| optional_values_equal(*x, *y))
        }
        _ => false,
    };
    (!equal).then(|| new.clone())
}

/// Only explicit connect/disconnect mutations count.
fn diff_relation(new: &Value) -> Option<Value> {
    let has_entries = |key: &str| {
        new.get(key)
            .and_then(Value::as_array)
            .is_some_and(|entries| !entries.is_empty())
    };
    (has_entries("connect") || has_entries("disconnect")).then(|| new.clone())
}

fn optional_values_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => values_equal(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Deep equality that treats `1` and `1.0` as the same number
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            x == y
                || matches!((x.as_f64(), y.as_f64()), (Some(p), Some(q)) if p == q)
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(p, q)| values_equal(p, q))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| values_equal(v, w)))
        }
        _ => a == b,
    }
}
