pub mod diff;
pub mod trail;

use anyhow::Context;
use serde_json::Value;
use std::path::Path;

/// Parse a JSON document from disk
pub fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}
