use serde_json::{Map, Value};

/// The minimal set of changed values between two content trees
///
/// Same shape as the content tree it was computed from, holding only the
/// differing paths. Never contains an empty object or array as a leaf;
/// empty `{}` entries only appear as positional placeholders inside a
/// repeatable-component sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    fields: Map<String, Value>,
    paths: Vec<String>,
}

impl ChangeSet {
    pub(crate) fn new(fields: Map<String, Value>, paths: Vec<String>) -> Self {
        Self { fields, paths }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of changed top-level attributes
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Dotted paths of every emitted leaf, in walk order (`blocks.0.title`)
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}
