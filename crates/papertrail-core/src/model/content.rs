//! Content trees as exchanged with the host: plain JSON objects.

use serde_json::{Map, Value};

/// A record's attribute values keyed by attribute name
pub type ContentTree = Map<String, Value>;

/// Identifier key present on every record, component instance and media item
pub const ID_KEY: &str = "id";

/// Key carrying a dynamic-zone item's component uid
pub const COMPONENT_TAG: &str = "__component";

/// Identifier of a media reference given either as a bare id or as `{id, ...}`
pub fn media_id(value: &Value) -> Option<&Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => map.get(ID_KEY).filter(|id| !id.is_null()),
        other => Some(other),
    }
}

/// Ordered identifiers of a multiple-media value; `None` when not a list
pub fn media_ids(value: &Value) -> Option<Vec<Option<&Value>>> {
    value
        .as_array()
        .map(|items| items.iter().map(media_id).collect())
}

/// Component uid declared by a dynamic-zone item
pub fn component_tag(item: &Value) -> Option<&str> {
    item.get(COMPONENT_TAG).and_then(Value::as_str)
}

/// True for `{}` and `[]`
pub fn is_empty_branch(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
